//! Header checks run before any row is normalized.

use intake_model::{SheetData, SourceDefinition};

/// Required mapped headers absent from the fetched header row.
pub fn missing_required_headers(source: &SourceDefinition, sheet: &SheetData) -> Vec<String> {
    missing(source, sheet, true)
}

/// Optional mapped headers absent from the fetched header row.
pub fn missing_optional_headers(source: &SourceDefinition, sheet: &SheetData) -> Vec<String> {
    missing(source, sheet, false)
}

fn missing(source: &SourceDefinition, sheet: &SheetData, required: bool) -> Vec<String> {
    source
        .columns
        .iter()
        .filter(|mapping| mapping.required == required)
        .filter(|mapping| !sheet.has_header(&mapping.source_header))
        .map(|mapping| mapping.source_header.clone())
        .collect()
}
