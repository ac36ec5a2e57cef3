use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{CandidateId, LeadId, SourceKey};
use crate::source::TargetCollection;

/// What a duplicate candidate matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DuplicateRef {
    /// An existing canonical lead.
    Lead { lead_id: LeadId },
    /// An earlier candidate of the same batch.
    ///
    /// Rows sharing a source row id also share a candidate id, so the row
    /// number is what tells the two apart.
    Candidate {
        candidate_id: CandidateId,
        row_number: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Ready,
    Invalid,
    Duplicate,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Invalid => "invalid",
            Self::Duplicate => "duplicate",
        }
    }
}

/// A normalized source row that has not been imported yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub source_key: SourceKey,
    /// Record number of the originating row, used for writeback.
    pub row_number: u64,
    pub core: BTreeMap<String, String>,
    pub flow: BTreeMap<String, String>,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub is_duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<DuplicateRef>,
}

impl CandidateRecord {
    pub fn new(id: CandidateId, source_key: SourceKey, row_number: u64) -> Self {
        Self {
            id,
            source_key,
            row_number,
            core: BTreeMap::new(),
            flow: BTreeMap::new(),
            is_valid: true,
            errors: Vec::new(),
            is_duplicate: false,
            duplicate_of: None,
        }
    }

    pub fn insert_field(
        &mut self,
        collection: TargetCollection,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let map = match collection {
            TargetCollection::Core => &mut self.core,
            TargetCollection::Flow => &mut self.flow,
        };
        map.insert(name.into(), value.into());
    }

    /// Reads a field from either collection, core first.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.core
            .get(name)
            .or_else(|| self.flow.get(name))
            .map(String::as_str)
    }

    /// Merged view of both collections.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.core
            .iter()
            .chain(self.flow.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn status(&self) -> CandidateStatus {
        if !self.is_valid {
            CandidateStatus::Invalid
        } else if self.is_duplicate {
            CandidateStatus::Duplicate
        } else {
            CandidateStatus::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == CandidateStatus::Ready
    }

    pub fn mark_duplicate(&mut self, of: DuplicateRef) {
        self.is_duplicate = true;
        self.duplicate_of = Some(of);
    }
}
