use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use intake_core::RowSource;
use intake_model::{CellValue, RawRow, SheetData, SourceError, SourceLocation};

/// Source tabs stored as CSV files under `<root>/<workbook>/<tab>.csv`.
///
/// The first record of each file is the header row. Data rows are numbered
/// from 1 in file order; blank rows keep their number but are not returned.
#[derive(Debug)]
pub struct CsvWorkbook {
    root: PathBuf,
    write_lock: Mutex<()>,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn is_blank(record: &[String]) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}

impl CsvWorkbook {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn tab_path(&self, location: &SourceLocation) -> PathBuf {
        self.root
            .join(&location.workbook)
            .join(format!("{}.csv", location.tab))
    }

    /// Reads a tab as raw records, header first.
    fn read_records(&self, path: &Path) -> Result<Vec<Vec<String>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("read csv: {}", path.display()))?;
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("read record: {}", path.display()))?;
            records.push(record.iter().map(normalize_cell).collect());
        }
        Ok(records)
    }

    fn load(&self, location: &SourceLocation) -> Result<SheetData> {
        let path = self.tab_path(location);
        let records = self.read_records(&path)?;
        let Some((header, data)) = records.split_first() else {
            return Ok(SheetData::default());
        };
        let headers: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();

        let mut rows = Vec::new();
        for (index, record) in data.iter().enumerate() {
            if is_blank(record) {
                continue;
            }
            let mut row = RawRow::new(index as u64 + 1);
            for (idx, name) in headers.iter().enumerate() {
                if name.is_empty() {
                    continue;
                }
                let value = record.get(idx).map(String::as_str).unwrap_or("");
                row.cells.insert(name.clone(), CellValue::from(value));
            }
            rows.push(row);
        }
        debug!(
            path = %path.display(),
            columns = headers.len(),
            rows = rows.len(),
            "loaded workbook tab"
        );
        Ok(SheetData { headers, rows })
    }

    fn store(
        &self,
        location: &SourceLocation,
        row_number: u64,
        columns: &BTreeMap<String, String>,
    ) -> Result<()> {
        let path = self.tab_path(location);
        let mut records = self.read_records(&path)?;
        if records.is_empty() {
            return Err(anyhow!("tab has no header row"));
        }

        let mut indices = Vec::with_capacity(columns.len());
        for name in columns.keys() {
            let existing = records[0]
                .iter()
                .position(|header| normalize_header(header).eq_ignore_ascii_case(name.trim()));
            let index = match existing {
                Some(index) => index,
                None => {
                    records[0].push(name.clone());
                    records[0].len() - 1
                }
            };
            indices.push(index);
        }

        let width = records[0].len();
        let record = usize::try_from(row_number)
            .ok()
            .filter(|n| *n > 0)
            .and_then(|n| records.get_mut(n))
            .filter(|record| !is_blank(record))
            .ok_or_else(|| anyhow!("row {row_number} not found"))?;
        if record.len() < width {
            record.resize(width, String::new());
        }
        for (index, value) in indices.into_iter().zip(columns.values()) {
            record[index] = value.clone();
        }
        for record in records.iter_mut().skip(1) {
            if record.len() < width {
                record.resize(width, String::new());
            }
        }

        let staging = path.with_extension("csv.tmp");
        {
            let mut writer = WriterBuilder::new()
                .from_path(&staging)
                .with_context(|| format!("write csv: {}", staging.display()))?;
            for record in &records {
                writer
                    .write_record(record)
                    .with_context(|| format!("write record: {}", staging.display()))?;
            }
            writer
                .flush()
                .with_context(|| format!("flush csv: {}", staging.display()))?;
        }
        fs::rename(&staging, &path)
            .with_context(|| format!("replace {}", path.display()))?;
        debug!(path = %path.display(), row_number, "wrote back row");
        Ok(())
    }
}

impl RowSource for CsvWorkbook {
    fn fetch_rows(&self, location: &SourceLocation) -> Result<SheetData, SourceError> {
        self.load(location).map_err(|e| SourceError::Unreachable {
            location: location.to_string(),
            message: format!("{e:#}"),
        })
    }

    fn write_back(
        &self,
        location: &SourceLocation,
        row_number: u64,
        columns: &BTreeMap<String, String>,
    ) -> Result<(), SourceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.store(location, row_number, columns)
            .map_err(|e| SourceError::WriteFailed {
                location: location.to_string(),
                row_number,
                message: format!("{e:#}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_trimmed_and_collapsed() {
        assert_eq!(normalize_header("\u{feff} Imported   At "), "Imported At");
        assert_eq!(normalize_cell("  R1 "), "R1");
    }
}
