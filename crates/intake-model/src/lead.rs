use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::CandidateRecord;
use crate::ids::{Actor, LeadId, SourceKey};

/// Canonical field holding the phone number used for deduplication.
pub const PHONE_FIELD: &str = "number";
/// Canonical field holding the source-side row identifier.
pub const SOURCE_ROW_ID_FIELD: &str = "sourceRowId";
/// Stage assigned to freshly imported leads.
pub const DEFAULT_STAGE: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAction {
    pub action: String,
    pub date: NaiveDate,
}

/// The authoritative lead record owned by the lead store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalLead {
    pub lead_id: LeadId,
    pub source_key: SourceKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_row_id: Option<String>,
    #[serde(default)]
    pub core: BTreeMap<String, String>,
    #[serde(default)]
    pub flow: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<NextAction>,
    pub created_at: DateTime<Utc>,
    pub created_by: Actor,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalLead {
    /// Builds the stored record for a freshly inserted lead.
    pub fn from_new(lead_id: LeadId, new: NewLead) -> Self {
        Self {
            lead_id,
            source_key: new.source_key,
            source_row_id: new.source_row_id,
            core: new.core,
            flow: new.flow,
            owner: None,
            stage: DEFAULT_STAGE.to_string(),
            next_action: None,
            created_at: new.created_at,
            created_by: new.created_by,
            updated_at: new.created_at,
        }
    }

    /// Reads a field from either collection, core first.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.core
            .get(name)
            .or_else(|| self.flow.get(name))
            .map(String::as_str)
    }

    pub fn phone(&self) -> Option<&str> {
        self.field(PHONE_FIELD)
    }

    pub fn apply_patch(&mut self, patch: &LeadPatch, now: DateTime<Utc>) {
        match patch {
            LeadPatch::Owner(owner) => self.owner = Some(owner.clone()),
            LeadPatch::Stage(stage) => self.stage = stage.clone(),
            LeadPatch::NextAction(next) => self.next_action = Some(next.clone()),
        }
        self.updated_at = now;
    }
}

/// Insert request handed to the lead store by the import coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub source_key: SourceKey,
    pub source_row_id: Option<String>,
    pub core: BTreeMap<String, String>,
    pub flow: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Actor,
}

impl NewLead {
    pub fn from_candidate(candidate: &CandidateRecord, actor: &Actor, now: DateTime<Utc>) -> Self {
        let source_row_id = candidate
            .field(SOURCE_ROW_ID_FIELD)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self {
            source_key: candidate.source_key.clone(),
            source_row_id,
            core: candidate.core.clone(),
            flow: candidate.flow.clone(),
            created_at: now,
            created_by: actor.clone(),
        }
    }
}

/// A single-attribute mutation of an existing lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LeadPatch {
    Owner(String),
    Stage(String),
    NextAction(NextAction),
}
