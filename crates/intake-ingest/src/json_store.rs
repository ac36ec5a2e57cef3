use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use intake_core::LeadStore;
use intake_model::{CanonicalLead, LeadId, LeadPatch, NewLead, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    leads: Vec<CanonicalLead>,
}

/// Lead store persisted as a single JSON document.
///
/// The document is loaded once on open and rewritten after every change.
#[derive(Debug)]
pub struct JsonLeadStore {
    path: PathBuf,
    state: Mutex<StoreFile>,
}

impl JsonLeadStore {
    /// Opens the store at `path`; a missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read lead store: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parse lead store: {}", path.display()))?
        } else {
            StoreFile::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> MutexGuard<'_, StoreFile> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(state).context("serialize lead store")?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)
            .with_context(|| format!("write lead store: {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("replace lead store: {}", self.path.display()))?;
        Ok(())
    }
}

fn unavailable(error: &anyhow::Error) -> StoreError {
    StoreError::Unavailable {
        message: format!("{error:#}"),
    }
}

impl LeadStore for JsonLeadStore {
    fn list_leads(&self) -> Result<Vec<CanonicalLead>, StoreError> {
        Ok(self.lock().leads.clone())
    }

    fn create_lead(&self, lead: NewLead) -> Result<CanonicalLead, StoreError> {
        let mut state = self.lock();
        let next_id = state.next_id + 1;
        let lead_id = LeadId::new(format!("LD-{next_id:06}")).map_err(|e| {
            StoreError::Unavailable {
                message: e.to_string(),
            }
        })?;
        let created = CanonicalLead::from_new(lead_id, lead);
        state.next_id = next_id;
        state.leads.push(created.clone());
        if let Err(error) = self.persist(&state) {
            state.leads.pop();
            state.next_id -= 1;
            return Err(unavailable(&error));
        }
        debug!(lead_id = %created.lead_id, "stored lead");
        Ok(created)
    }

    fn mutate_lead(&self, lead_id: &LeadId, patch: &LeadPatch) -> Result<CanonicalLead, StoreError> {
        let mut state = self.lock();
        let index = state
            .leads
            .iter()
            .position(|lead| &lead.lead_id == lead_id)
            .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))?;
        let previous = state.leads[index].clone();
        state.leads[index].apply_patch(patch, Utc::now());
        if let Err(error) = self.persist(&state) {
            state.leads[index] = previous;
            return Err(unavailable(&error));
        }
        Ok(state.leads[index].clone())
    }
}
