//! Bulk actions over already-imported leads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BulkError, StoreError};
use crate::ids::LeadId;
use crate::lead::{CanonicalLead, LeadPatch, NextAction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BulkAction {
    ReassignOwner { owner: String },
    MoveStage { stage: String },
    ScheduleNextAction { action: String, date: String },
}

impl BulkAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReassignOwner { .. } => "reassign_owner",
            Self::MoveStage { .. } => "move_stage",
            Self::ScheduleNextAction { .. } => "schedule_next_action",
        }
    }

    /// Checks the payload and turns it into the patch applied to every lead.
    ///
    /// Dates must be ISO `YYYY-MM-DD`.
    pub fn to_patch(&self) -> Result<LeadPatch, BulkError> {
        match self {
            Self::ReassignOwner { owner } => {
                let owner = owner.trim();
                if owner.is_empty() {
                    return Err(BulkError::invalid("owner", "must not be empty"));
                }
                Ok(LeadPatch::Owner(owner.to_string()))
            }
            Self::MoveStage { stage } => {
                let stage = stage.trim();
                if stage.is_empty() {
                    return Err(BulkError::invalid("stage", "must not be empty"));
                }
                Ok(LeadPatch::Stage(stage.to_string()))
            }
            Self::ScheduleNextAction { action, date } => {
                let action = action.trim();
                if action.is_empty() {
                    return Err(BulkError::invalid("action", "must not be empty"));
                }
                let date = date.trim();
                if date.is_empty() {
                    return Err(BulkError::invalid("date", "is required"));
                }
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| BulkError::invalid("date", "must be YYYY-MM-DD"))?;
                Ok(LeadPatch::NextAction(NextAction {
                    action: action.to_string(),
                    date,
                }))
            }
        }
    }
}

/// Result of mutating one lead of a bulk call.
#[derive(Debug, Clone)]
pub struct BulkOutcome {
    pub lead_id: LeadId,
    pub result: Result<CanonicalLead, StoreError>,
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_owner_is_invalid() {
        let action = BulkAction::ReassignOwner {
            owner: "  ".to_string(),
        };
        assert!(matches!(
            action.to_patch(),
            Err(BulkError::InvalidPayload { ref field, .. }) if field == "owner"
        ));
    }

    #[test]
    fn schedule_requires_parseable_date() {
        let missing = BulkAction::ScheduleNextAction {
            action: "call".to_string(),
            date: String::new(),
        };
        assert!(missing.to_patch().is_err());

        let garbled = BulkAction::ScheduleNextAction {
            action: "call".to_string(),
            date: "next tuesday".to_string(),
        };
        assert!(garbled.to_patch().is_err());

        let ok = BulkAction::ScheduleNextAction {
            action: "call".to_string(),
            date: "2026-11-02".to_string(),
        };
        assert_eq!(
            ok.to_patch().unwrap(),
            LeadPatch::NextAction(NextAction {
                action: "call".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            })
        );
    }
}
