use tracing::trace;

use intake_model::{
    CandidateId, CandidateRecord, CellValue, RawRow, SOURCE_ROW_ID_FIELD, SourceDefinition,
};

/// Validation message for a required mapping whose value came out empty.
pub fn required_field_message(target_field: &str) -> String {
    format!("missing required field: {target_field}")
}

/// Source-side identifier used to derive the candidate id.
///
/// Prefers a mapped `sourceRowId` column when it holds a value, otherwise
/// falls back to the row's record number.
pub fn row_identifier(source: &SourceDefinition, row: &RawRow) -> String {
    source
        .mapping_for_field(SOURCE_ROW_ID_FIELD)
        .and_then(|mapping| row.get(&mapping.source_header))
        .map(CellValue::as_text)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("#{}", row.row_number))
}

/// Maps one raw row onto a candidate record.
///
/// Every mapping is applied in order; the candidate is valid iff no required
/// mapping produced an empty value. Duplicate flags start cleared.
pub fn normalize(source: &SourceDefinition, row: &RawRow) -> CandidateRecord {
    let id = CandidateId::derive(&source.key, &row_identifier(source, row));
    let mut candidate = CandidateRecord::new(id, source.key.clone(), row.row_number);

    for mapping in &source.columns {
        let raw = row.get(&mapping.source_header).map(CellValue::as_text);
        let value = intake_transform::apply(mapping.transform, raw.as_deref());
        if mapping.required && value.trim().is_empty() {
            candidate
                .errors
                .push(required_field_message(&mapping.target_field));
        }
        candidate.insert_field(mapping.collection, mapping.target_field.clone(), value);
    }

    candidate.is_valid = candidate.errors.is_empty();
    trace!(
        source_key = %source.key,
        row_number = row.row_number,
        candidate_id = %candidate.id,
        is_valid = candidate.is_valid,
        error_count = candidate.errors.len(),
        "normalized row"
    );
    candidate
}

/// Normalizes every row, preserving row order.
pub fn normalize_rows<'a, I>(source: &SourceDefinition, rows: I) -> Vec<CandidateRecord>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    rows.into_iter().map(|row| normalize(source, row)).collect()
}
