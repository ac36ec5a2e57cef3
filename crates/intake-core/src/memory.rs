//! In-memory row source and lead store.
//!
//! Used by tests and dry runs. Failure injection lets callers exercise the
//! partial-import and unreachable-source paths without a real transport.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use intake_model::{
    CanonicalLead, CellValue, LeadId, LeadPatch, NewLead, SheetData, SourceError, SourceLocation,
    StoreError,
};

use crate::ports::{LeadStore, RowSource};

#[derive(Debug, Default)]
struct SourceState {
    tabs: HashMap<SourceLocation, SheetData>,
    unreachable: HashSet<SourceLocation>,
    failing_writebacks: HashSet<(SourceLocation, u64)>,
}

/// Tabs held in memory, keyed by location.
#[derive(Debug, Default)]
pub struct MemoryRowSource {
    state: Mutex<SourceState>,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(self, location: SourceLocation, sheet: SheetData) -> Self {
        self.insert_tab(location, sheet);
        self
    }

    pub fn insert_tab(&self, location: SourceLocation, sheet: SheetData) {
        let mut state = self.lock();
        state.unreachable.remove(&location);
        state.tabs.insert(location, sheet);
    }

    /// Every fetch of `location` fails until the tab is reinserted.
    pub fn set_unreachable(&self, location: SourceLocation) {
        let mut state = self.lock();
        state.tabs.remove(&location);
        state.unreachable.insert(location);
    }

    /// Writebacks to the given row fail.
    pub fn fail_writeback(&self, location: SourceLocation, row_number: u64) {
        self.lock().failing_writebacks.insert((location, row_number));
    }

    /// Current contents of a tab.
    pub fn sheet(&self, location: &SourceLocation) -> Option<SheetData> {
        self.lock().tabs.get(location).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        // Every mutation leaves the state consistent, so a poisoned lock is
        // still safe to read.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl RowSource for MemoryRowSource {
    fn fetch_rows(&self, location: &SourceLocation) -> Result<SheetData, SourceError> {
        let state = self.lock();
        if state.unreachable.contains(location) {
            return Err(SourceError::Unreachable {
                location: location.to_string(),
                message: "connection refused".to_string(),
            });
        }
        state
            .tabs
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::Unreachable {
                location: location.to_string(),
                message: "tab not found".to_string(),
            })
    }

    fn write_back(
        &self,
        location: &SourceLocation,
        row_number: u64,
        columns: &BTreeMap<String, String>,
    ) -> Result<(), SourceError> {
        let mut state = self.lock();
        let write_failed = |message: &str| SourceError::WriteFailed {
            location: location.to_string(),
            row_number,
            message: message.to_string(),
        };
        if state
            .failing_writebacks
            .contains(&(location.clone(), row_number))
        {
            return Err(write_failed("write rejected"));
        }
        let sheet = state
            .tabs
            .get_mut(location)
            .ok_or_else(|| write_failed("tab not found"))?;
        for name in columns.keys() {
            if !sheet.has_header(name) {
                sheet.headers.push(name.clone());
            }
        }
        let row = sheet
            .rows
            .iter_mut()
            .find(|row| row.row_number == row_number)
            .ok_or_else(|| write_failed("row not found"))?;
        for (name, value) in columns {
            row.cells
                .insert(name.clone(), CellValue::from(value.as_str()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    leads: Vec<CanonicalLead>,
    next_id: u64,
    unavailable: bool,
}

/// Lead store backed by a vector. Ids are issued as `LD-000001`, `LD-000002`, ...
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    state: Mutex<StoreState>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing leads. New ids continue after the seed count.
    pub fn with_leads(leads: Vec<CanonicalLead>) -> Self {
        let next_id = leads.len() as u64;
        Self {
            state: Mutex::new(StoreState {
                leads,
                next_id,
                unavailable: false,
            }),
        }
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn leads(&self) -> Vec<CanonicalLead> {
        self.lock().leads.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn ensure_available(state: &StoreState) -> Result<(), StoreError> {
    if state.unavailable {
        return Err(StoreError::Unavailable {
            message: "lead store offline".to_string(),
        });
    }
    Ok(())
}

impl LeadStore for MemoryLeadStore {
    fn list_leads(&self) -> Result<Vec<CanonicalLead>, StoreError> {
        let state = self.lock();
        ensure_available(&state)?;
        Ok(state.leads.clone())
    }

    fn create_lead(&self, lead: NewLead) -> Result<CanonicalLead, StoreError> {
        let mut state = self.lock();
        ensure_available(&state)?;
        state.next_id += 1;
        let lead_id = LeadId::new(format!("LD-{:06}", state.next_id)).map_err(|e| {
            StoreError::Unavailable {
                message: e.to_string(),
            }
        })?;
        let created = CanonicalLead::from_new(lead_id, lead);
        state.leads.push(created.clone());
        Ok(created)
    }

    fn mutate_lead(&self, lead_id: &LeadId, patch: &LeadPatch) -> Result<CanonicalLead, StoreError> {
        let mut state = self.lock();
        ensure_available(&state)?;
        let lead = state
            .leads
            .iter_mut()
            .find(|lead| &lead.lead_id == lead_id)
            .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))?;
        lead.apply_patch(patch, Utc::now());
        Ok(lead.clone())
    }
}
