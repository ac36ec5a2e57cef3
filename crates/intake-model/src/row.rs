#![deny(unsafe_code)]

use std::collections::BTreeMap;

use crate::source::WritebackColumns;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// Renders the cell as text; numbers drop trailing zeros (`10.50` → `10.5`).
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_numeric(*value),
            Self::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
            Self::Empty => String::new(),
        }
    }

    /// Spreadsheet renderings of an unticked checkbox.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Bool(value) => !value,
            Self::Number(value) => *value == 0.0,
            Self::Text(value) => ["false", "0", "no"]
                .iter()
                .any(|falsy| value.trim().eq_ignore_ascii_case(falsy)),
            Self::Empty => false,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Empty => true,
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// One raw row of a source tab.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawRow {
    /// Record number within the tab (1-based, excluding header).
    pub row_number: u64,
    pub cells: BTreeMap<String, CellValue>,
}

impl RawRow {
    pub fn new(row_number: u64) -> Self {
        Self {
            row_number,
            cells: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(header.into(), value.into());
        self
    }

    /// Looks up a cell by header, ignoring surrounding whitespace and ASCII case.
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        let wanted = header.trim();
        if let Some(cell) = self.cells.get(wanted) {
            return Some(cell);
        }
        self.cells
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, cell)| cell)
    }

    pub fn text(&self, header: &str) -> Option<String> {
        self.get(header).map(CellValue::as_text)
    }

    /// True when any writeback column already holds a value.
    ///
    /// An unticked `processed` checkbox (`FALSE`, `0`, `no`) is not a marker
    /// on its own; the row still counts as marked if any other writeback
    /// column is filled in.
    pub fn has_writeback_marker(&self, writeback: &WritebackColumns) -> bool {
        let processed = self
            .get(&writeback.processed)
            .is_some_and(|cell| !cell.is_blank() && !cell.is_falsy());
        processed
            || writeback.names()[1..]
                .iter()
                .any(|name| self.get(name).is_some_and(|cell| !cell.is_blank()))
    }
}

/// Header row plus data rows returned by a fetch.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetData {
    pub fn has_header(&self, header: &str) -> bool {
        let wanted = header.trim();
        self.headers
            .iter()
            .any(|name| name.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn row(&self, row_number: u64) -> Option<&RawRow> {
        self.rows.iter().find(|row| row.row_number == row_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_zeros() {
        assert_eq!(CellValue::Number(10.0).as_text(), "10");
        assert_eq!(CellValue::Number(10.5).as_text(), "10.5");
        assert_eq!(CellValue::Number(9876543210.0).as_text(), "9876543210");
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let row = RawRow::new(1).with_cell("NUMBER ", "123");
        assert_eq!(row.text("number").as_deref(), Some("123"));
        assert!(row.get("company_name").is_none());
    }

    #[test]
    fn writeback_marker_detects_any_column() {
        let writeback = WritebackColumns::default();
        let fresh = RawRow::new(1).with_cell("processed", "");
        assert!(!fresh.has_writeback_marker(&writeback));
        let done = RawRow::new(2).with_cell("lead_ref", "LD-000001");
        assert!(done.has_writeback_marker(&writeback));
    }

    #[test]
    fn unticked_processed_checkbox_is_not_a_marker() {
        let writeback = WritebackColumns::default();
        for unticked in [
            CellValue::from("FALSE"),
            CellValue::from("0"),
            CellValue::Bool(false),
            CellValue::Number(0.0),
        ] {
            let row = RawRow::new(1).with_cell("processed", unticked);
            assert!(!row.has_writeback_marker(&writeback));
        }

        let ticked = RawRow::new(2).with_cell("processed", CellValue::Bool(true));
        assert!(ticked.has_writeback_marker(&writeback));
        let stamped = RawRow::new(3)
            .with_cell("processed", "FALSE")
            .with_cell("processed_by", "priya");
        assert!(stamped.has_writeback_marker(&writeback));
    }
}
