use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateRecord, CandidateStatus};
use crate::error::{ImportError, ScanError};
use crate::ids::{CandidateId, SourceKey};
use crate::lead::CanonicalLead;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub ready: usize,
    pub invalid: usize,
    pub duplicate: usize,
    /// Rows skipped because they already carry a writeback marker.
    pub already_imported: usize,
}

impl ScanStats {
    pub fn from_candidates(candidates: &[CandidateRecord]) -> Self {
        let mut stats = Self::default();
        for candidate in candidates {
            match candidate.status() {
                CandidateStatus::Ready => stats.ready += 1,
                CandidateStatus::Invalid => stats.invalid += 1,
                CandidateStatus::Duplicate => stats.duplicate += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.ready + self.invalid + self.duplicate
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMeta {
    pub missing_headers: Vec<String>,
}

/// Outcome of scanning one source. Rebuilt on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub source_key: SourceKey,
    pub rows: Vec<CandidateRecord>,
    pub stats: ScanStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ScanError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ScanMeta>,
}

impl ScanResult {
    pub fn failed(source_key: SourceKey, error: ScanError) -> Self {
        let meta = match &error {
            ScanError::MissingHeaders { headers } => Some(ScanMeta {
                missing_headers: headers.clone(),
            }),
            _ => None,
        };
        Self {
            source_key,
            rows: Vec::new(),
            stats: ScanStats::default(),
            error: Some(error),
            meta,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn ready(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.rows.iter().filter(|candidate| candidate.is_ready())
    }
}

/// Result of importing one candidate of a batch.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub candidate_id: CandidateId,
    pub row_number: u64,
    pub result: Result<CanonicalLead, ImportError>,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.result, Err(ImportError::PartialImport { .. }))
    }
}
