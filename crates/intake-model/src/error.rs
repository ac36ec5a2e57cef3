use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lead::CanonicalLead;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid source key: {0:?}")]
    InvalidSourceKey(String),
    #[error("invalid lead id: {0:?}")]
    InvalidLeadId(String),
    #[error("invalid actor: {0:?}")]
    InvalidActor(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("unknown transform: {name}")]
    Unknown { name: String },
    #[error("unknown target collection: {name}")]
    UnknownCollection { name: String },
}

/// Failures reported by a row source transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source {location} unreachable: {message}")]
    Unreachable { location: String, message: String },

    #[error("write back to {location} row {row_number} failed: {message}")]
    WriteFailed {
        location: String,
        row_number: u64,
        message: String,
    },
}

/// Failures reported by the canonical lead store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("lead not found: {0}")]
    NotFound(String),
    #[error("lead store unavailable: {message}")]
    Unavailable { message: String },
}

/// Fetch-level failure of a single source scan.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanError {
    #[error("unknown source: {key}")]
    UnknownSource { key: String },

    #[error("source unreachable: {message}")]
    SourceUnreachable { message: String },

    #[error("missing required headers: {}", headers.join(", "))]
    MissingHeaders { headers: Vec<String> },
}

impl ScanError {
    /// Whether a later rescan may succeed without a configuration change.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::UnknownSource { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotImportableReason {
    Invalid,
    Duplicate,
}

impl NotImportableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "candidate failed validation",
            Self::Duplicate => "candidate is a duplicate",
        }
    }
}

/// Per-row import failure.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("not importable: {}", reason.as_str())]
    NotImportable { reason: NotImportableReason },

    #[error("unknown source: {key}")]
    UnknownSource { key: String },

    #[error("row already imported{}", lead_id.as_deref().map(|id| format!(" as {id}")).unwrap_or_default())]
    AlreadyImported { lead_id: Option<String> },

    #[error("row {row_number} no longer exists in the source")]
    RowMissing { row_number: u64 },

    #[error("row {row_number} no longer matches the scanned candidate; rescan the source")]
    RowChanged { row_number: u64 },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("lead {} created but writeback not confirmed: {reason}", lead.lead_id)]
    PartialImport {
        lead: Box<CanonicalLead>,
        reason: String,
    },
}

impl ImportError {
    /// I/O failures before any lead was created are retryable; validation,
    /// duplicate and idempotency rejections are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Store(_))
    }

    /// The row has to be rescanned before anything else is attempted.
    ///
    /// A partial import left a lead without a row marker, so importing the
    /// same candidate again would create a second lead.
    pub fn requires_rescan(&self) -> bool {
        matches!(self, Self::RowChanged { .. } | Self::PartialImport { .. })
    }

    /// The lead that exists despite the failure, if any.
    pub fn created_lead(&self) -> Option<&CanonicalLead> {
        match self {
            Self::PartialImport { lead, .. } => Some(lead),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    #[error("invalid payload: {field} {reason}")]
    InvalidPayload { field: String, reason: String },
}

impl BulkError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        Self::InvalidPayload {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
