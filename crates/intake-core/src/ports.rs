//! Collaborator interfaces consumed by the scan and import stages.
//!
//! The transport behind a source tab and the canonical lead store are
//! external; the core only talks to them through these traits.

use std::collections::BTreeMap;

use intake_model::{
    CanonicalLead, LeadId, LeadPatch, NewLead, RawRow, SheetData, SourceError, SourceLocation,
    StoreError,
};

/// Read/write access to the tabs backing each source.
pub trait RowSource: Send + Sync {
    /// Reads the header row and every data row of a tab.
    fn fetch_rows(&self, location: &SourceLocation) -> Result<SheetData, SourceError>;

    /// Reads a single data row by record number.
    ///
    /// The default implementation fetches the whole tab.
    fn fetch_row(
        &self,
        location: &SourceLocation,
        row_number: u64,
    ) -> Result<Option<RawRow>, SourceError> {
        let sheet = self.fetch_rows(location)?;
        Ok(sheet
            .rows
            .into_iter()
            .find(|row| row.row_number == row_number))
    }

    /// Writes the named columns onto an existing row.
    fn write_back(
        &self,
        location: &SourceLocation,
        row_number: u64,
        columns: &BTreeMap<String, String>,
    ) -> Result<(), SourceError>;
}

/// The canonical lead store.
pub trait LeadStore: Send + Sync {
    /// Read-only snapshot of every lead, in store order.
    fn list_leads(&self) -> Result<Vec<CanonicalLead>, StoreError>;

    fn create_lead(&self, lead: NewLead) -> Result<CanonicalLead, StoreError>;

    fn mutate_lead(&self, lead_id: &LeadId, patch: &LeadPatch) -> Result<CanonicalLead, StoreError>;
}
