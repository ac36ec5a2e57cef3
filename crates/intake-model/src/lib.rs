//! Lead intake data model.
//!
//! Shared types for the intake pipeline: source definitions, raw rows,
//! candidates, canonical leads, scan results and the error taxonomy.

pub mod action;
pub mod candidate;
pub mod error;
pub mod ids;
pub mod lead;
pub mod row;
pub mod scan;
pub mod source;

pub use action::{BulkAction, BulkOutcome};
pub use candidate::{CandidateRecord, CandidateStatus, DuplicateRef};
pub use error::{
    BulkError, ImportError, ModelError, NotImportableReason, ScanError, SourceError, StoreError,
    TransformError,
};
pub use ids::{Actor, CandidateId, LeadId, SourceKey};
pub use lead::{
    CanonicalLead, DEFAULT_STAGE, LeadPatch, NewLead, NextAction, PHONE_FIELD, SOURCE_ROW_ID_FIELD,
};
pub use row::{CellValue, RawRow, SheetData, format_numeric};
pub use scan::{ImportOutcome, ScanMeta, ScanResult, ScanStats};
pub use source::{
    ColumnMapping, SourceDefinition, SourceLocation, TargetCollection, TransformKind,
    WritebackColumns,
};
