use std::thread;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use intake_map::{missing_optional_headers, missing_required_headers, normalize_rows};
use intake_model::{
    CanonicalLead, RawRow, ScanError, ScanResult, ScanStats, SourceDefinition, SourceKey,
    StoreError,
};
use intake_registry::SourceRegistry;

use crate::dedupe::mark_duplicates;
use crate::ports::{LeadStore, RowSource};

/// Runs fetch, normalize and dedup for one or more sources.
///
/// Scans are read-only: nothing is written to the source or the store.
#[derive(Clone, Copy)]
pub struct Scanner<'a> {
    registry: &'a SourceRegistry,
    source: &'a dyn RowSource,
}

impl<'a> Scanner<'a> {
    pub fn new(registry: &'a SourceRegistry, source: &'a dyn RowSource) -> Self {
        Self { registry, source }
    }

    /// Scans a single source against a snapshot of existing leads.
    ///
    /// Fetch-level failures are reported on the result, never raised.
    pub fn scan(&self, key: &SourceKey, existing: &[CanonicalLead]) -> ScanResult {
        let span = info_span!("scan", source_key = %key);
        let _guard = span.enter();
        let started = Instant::now();

        let definition = match self.registry.get(key.as_str()) {
            Ok(definition) => definition,
            Err(_) => {
                warn!("unknown source");
                return ScanResult::failed(
                    key.clone(),
                    ScanError::UnknownSource {
                        key: key.to_string(),
                    },
                );
            }
        };

        let result = self.scan_definition(definition, existing);
        match &result.error {
            Some(error) => warn!(
                error = %error,
                retryable = error.is_retryable(),
                "scan failed"
            ),
            None => info!(
                ready = result.stats.ready,
                invalid = result.stats.invalid,
                duplicate = result.stats.duplicate,
                already_imported = result.stats.already_imported,
                duration_ms = started.elapsed().as_millis(),
                "scan complete"
            ),
        }
        result
    }

    fn scan_definition(
        &self,
        definition: &SourceDefinition,
        existing: &[CanonicalLead],
    ) -> ScanResult {
        let key = definition.key.clone();
        let sheet = match self.source.fetch_rows(&definition.location) {
            Ok(sheet) => sheet,
            Err(error) => {
                return ScanResult::failed(
                    key,
                    ScanError::SourceUnreachable {
                        message: error.to_string(),
                    },
                );
            }
        };

        let missing = missing_required_headers(definition, &sheet);
        if !missing.is_empty() {
            return ScanResult::failed(key, ScanError::MissingHeaders { headers: missing });
        }
        let optional = missing_optional_headers(definition, &sheet);
        if !optional.is_empty() {
            warn!(headers = ?optional, "optional headers missing; fields will be empty");
        }

        let (marked, unmarked): (Vec<&RawRow>, Vec<&RawRow>) = sheet
            .rows
            .iter()
            .partition(|row| row.has_writeback_marker(&definition.writeback));
        let already_imported = marked.len();
        let candidates = normalize_rows(definition, unmarked);
        debug!(
            rows = sheet.rows.len(),
            already_imported, "normalized source rows"
        );

        let rows = mark_duplicates(&candidates, existing);
        let stats = ScanStats {
            already_imported,
            ..ScanStats::from_candidates(&rows)
        };
        ScanResult {
            source_key: key,
            rows,
            stats,
            error: None,
            meta: None,
        }
    }

    /// Scans several sources in parallel against one snapshot of `existing`.
    ///
    /// Results come back in the order of `keys`; one source failing does not
    /// affect the others.
    pub fn scan_many(&self, keys: &[SourceKey], existing: &[CanonicalLead]) -> Vec<ScanResult> {
        if keys.len() <= 1 {
            return keys.iter().map(|key| self.scan(key, existing)).collect();
        }

        thread::scope(|scope| {
            let handles: Vec<_> = keys
                .iter()
                .map(|key| (key, scope.spawn(move || self.scan(key, existing))))
                .collect();
            handles
                .into_iter()
                .map(|(key, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        ScanResult::failed(
                            key.clone(),
                            ScanError::SourceUnreachable {
                                message: "scan worker panicked".to_string(),
                            },
                        )
                    })
                })
                .collect()
        })
    }

    /// Takes one lead snapshot from `store` and scans every key against it.
    pub fn scan_all(
        &self,
        keys: &[SourceKey],
        store: &dyn LeadStore,
    ) -> Result<Vec<ScanResult>, StoreError> {
        let existing = store.list_leads()?;
        debug!(existing = existing.len(), "loaded lead snapshot");
        Ok(self.scan_many(keys, &existing))
    }

    /// Every registered source key, in registry order.
    pub fn registered_keys(&self) -> Vec<SourceKey> {
        self.registry.keys().cloned().collect()
    }
}
