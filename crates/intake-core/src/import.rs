use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, info_span, warn};

use intake_map::normalize;
use intake_model::{
    Actor, CandidateRecord, CanonicalLead, ImportError, ImportOutcome, NewLead,
    NotImportableReason, SourceDefinition,
};
use intake_registry::SourceRegistry;

use crate::locks::{RowKey, RowLocks};
use crate::ports::{LeadStore, RowSource};

/// Value written to the `processed` writeback column.
pub const PROCESSED_MARKER: &str = "TRUE";

/// Turns ready candidates into canonical leads and marks their source rows.
///
/// Each import runs check, create and writeback under the row's lock. A
/// retried import of a row whose writeback landed is rejected with
/// [`ImportError::AlreadyImported`] instead of creating a second lead.
pub struct ImportCoordinator<'a> {
    registry: &'a SourceRegistry,
    source: &'a dyn RowSource,
    store: &'a dyn LeadStore,
    locks: Arc<RowLocks>,
}

impl<'a> ImportCoordinator<'a> {
    pub fn new(
        registry: &'a SourceRegistry,
        source: &'a dyn RowSource,
        store: &'a dyn LeadStore,
    ) -> Self {
        Self {
            registry,
            source,
            store,
            locks: Arc::new(RowLocks::new()),
        }
    }

    /// Shares a lock table with other coordinators over the same source.
    pub fn with_locks(mut self, locks: Arc<RowLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn import_row(
        &self,
        candidate: &CandidateRecord,
        actor: &Actor,
    ) -> Result<CanonicalLead, ImportError> {
        let span = info_span!(
            "import",
            source_key = %candidate.source_key,
            row_number = candidate.row_number,
            candidate_id = %candidate.id,
        );
        let _guard = span.enter();

        if !candidate.is_valid {
            return Err(ImportError::NotImportable {
                reason: NotImportableReason::Invalid,
            });
        }
        if candidate.is_duplicate {
            return Err(ImportError::NotImportable {
                reason: NotImportableReason::Duplicate,
            });
        }
        let definition = self
            .registry
            .get(candidate.source_key.as_str())
            .map_err(|_| ImportError::UnknownSource {
                key: candidate.source_key.to_string(),
            })?;

        let key = RowKey::new(candidate.source_key.clone(), candidate.row_number);
        self.locks
            .with_row(&key, || self.import_locked(definition, candidate, actor))
    }

    fn import_locked(
        &self,
        definition: &SourceDefinition,
        candidate: &CandidateRecord,
        actor: &Actor,
    ) -> Result<CanonicalLead, ImportError> {
        let row_number = candidate.row_number;
        let row = self
            .source
            .fetch_row(&definition.location, row_number)?
            .ok_or(ImportError::RowMissing { row_number })?;

        if row.has_writeback_marker(&definition.writeback) {
            let lead_id = row
                .text(&definition.writeback.lead_id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            debug!(lead_id = ?lead_id, "row already carries a writeback marker");
            return Err(ImportError::AlreadyImported { lead_id });
        }
        // Row-number identifiers survive an inserted row, so compare content too.
        let current = normalize(definition, &row);
        if current.id != candidate.id
            || current.core != candidate.core
            || current.flow != candidate.flow
        {
            debug!(current_id = %current.id, "row content differs from the scanned candidate");
            return Err(ImportError::RowChanged { row_number });
        }

        let now = Utc::now();
        let lead = self
            .store
            .create_lead(NewLead::from_candidate(candidate, actor, now))?;

        let columns = writeback_values(definition, actor, &lead, now);
        if let Err(error) = self
            .source
            .write_back(&definition.location, row_number, &columns)
        {
            warn!(
                lead_id = %lead.lead_id,
                error = %error,
                "lead created but writeback failed"
            );
            return Err(ImportError::PartialImport {
                lead: Box::new(lead),
                reason: error.to_string(),
            });
        }

        info!(lead_id = %lead.lead_id, actor = %actor, "imported row");
        Ok(lead)
    }

    /// Imports candidates one after another, in order.
    ///
    /// A failure on one row never stops the batch.
    pub fn import_rows(&self, candidates: &[CandidateRecord], actor: &Actor) -> Vec<ImportOutcome> {
        let outcomes: Vec<ImportOutcome> = candidates
            .iter()
            .map(|candidate| ImportOutcome {
                candidate_id: candidate.id,
                row_number: candidate.row_number,
                result: self.import_row(candidate, actor),
            })
            .collect();
        let imported = outcomes.iter().filter(|o| o.is_success()).count();
        let partial = outcomes.iter().filter(|o| o.is_partial()).count();
        info!(
            requested = candidates.len(),
            imported,
            partial,
            failed = candidates.len() - imported - partial,
            "import batch complete"
        );
        outcomes
    }
}

/// Column values written onto an imported row.
pub fn writeback_values(
    definition: &SourceDefinition,
    actor: &Actor,
    lead: &CanonicalLead,
    now: DateTime<Utc>,
) -> BTreeMap<String, String> {
    let writeback = &definition.writeback;
    BTreeMap::from([
        (writeback.processed.clone(), PROCESSED_MARKER.to_string()),
        (
            writeback.processed_at.clone(),
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (writeback.processed_by.clone(), actor.to_string()),
        (writeback.lead_id.clone(), lead.lead_id.to_string()),
    ])
}
