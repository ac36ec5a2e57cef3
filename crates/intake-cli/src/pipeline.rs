//! Scan, import and bulk flows wired to the file-backed collaborators.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, info_span};

use intake_core::{ImportCoordinator, LeadStore, RowSource, Scanner, apply_bulk};
use intake_ingest::{CsvWorkbook, JsonLeadStore};
use intake_model::{
    Actor, BulkAction, BulkOutcome, CandidateRecord, ImportOutcome, LeadId, ScanResult, SourceKey,
};
use intake_registry::SourceRegistry;

use crate::logging::redact_value;

/// Where the registry, the workbooks and the lead store live.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Explicit registry manifest; falls back to `LEAD_INTAKE_REGISTRY`, then
    /// the builtin registry.
    pub registry: Option<PathBuf>,
    pub workbook_dir: PathBuf,
    pub store: PathBuf,
}

/// Loaded registry plus the collaborators it runs against.
pub struct Pipeline {
    pub registry: SourceRegistry,
    source: Box<dyn RowSource>,
    store: Box<dyn LeadStore>,
}

impl Pipeline {
    pub fn open(config: &PipelineConfig) -> Result<Self> {
        let registry =
            SourceRegistry::resolve(config.registry.as_deref()).context("load source registry")?;
        let store = JsonLeadStore::open(&config.store)
            .with_context(|| format!("open lead store: {}", config.store.display()))?;
        debug!(
            sources = registry.len(),
            workbook_dir = %config.workbook_dir.display(),
            "pipeline ready"
        );
        Ok(Self::with_collaborators(
            registry,
            Box::new(CsvWorkbook::new(&config.workbook_dir)),
            Box::new(store),
        ))
    }

    pub fn with_collaborators(
        registry: SourceRegistry,
        source: Box<dyn RowSource>,
        store: Box<dyn LeadStore>,
    ) -> Self {
        Self {
            registry,
            source,
            store,
        }
    }

    fn scanner(&self) -> Scanner<'_> {
        Scanner::new(&self.registry, self.source.as_ref())
    }

    /// Scans `keys`, or every registered source when `keys` is empty.
    pub fn scan(&self, keys: &[SourceKey]) -> Result<Vec<ScanResult>> {
        let scanner = self.scanner();
        let keys = if keys.is_empty() {
            scanner.registered_keys()
        } else {
            keys.to_vec()
        };
        scanner
            .scan_all(&keys, self.store.as_ref())
            .context("read existing leads")
    }

    /// Scans one source and imports its ready candidates, or the candidates
    /// on `rows` when given.
    pub fn import(&self, request: &ImportRequest) -> Result<ImportReport> {
        let span = info_span!("import_source", source_key = %request.source_key);
        let _guard = span.enter();

        let mut results = self.scan(std::slice::from_ref(&request.source_key))?;
        let scan = results
            .pop()
            .ok_or_else(|| anyhow!("scan returned no result"))?;
        if let Some(error) = &scan.error {
            bail!("scan of {} failed: {error}", scan.source_key);
        }

        let (selected, unmatched_rows) = select_candidates(&scan, &request.rows);
        if request.dry_run {
            info!(selected = selected.len(), "dry run; nothing imported");
            return Ok(ImportReport {
                scan,
                selected,
                unmatched_rows,
                outcomes: Vec::new(),
                dry_run: true,
            });
        }

        let coordinator =
            ImportCoordinator::new(&self.registry, self.source.as_ref(), self.store.as_ref());
        let outcomes = coordinator.import_rows(&selected, &request.actor);
        for (candidate, outcome) in selected.iter().zip(&outcomes) {
            debug!(
                row_number = outcome.row_number,
                company = redact_value(candidate.field("companyName").unwrap_or_default()),
                success = outcome.is_success(),
                "import outcome"
            );
        }
        Ok(ImportReport {
            scan,
            selected,
            unmatched_rows,
            outcomes,
            dry_run: false,
        })
    }

    pub fn bulk(&self, action: &BulkAction, lead_ids: &[LeadId]) -> Result<Vec<BulkOutcome>> {
        apply_bulk(self.store.as_ref(), action, lead_ids).context("bulk action rejected")
    }
}

#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub source_key: SourceKey,
    pub actor: Actor,
    /// Row numbers to import; empty means every ready candidate.
    pub rows: Vec<u64>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct ImportReport {
    pub scan: ScanResult,
    pub selected: Vec<CandidateRecord>,
    /// Requested rows the scan did not return (missing or already imported).
    pub unmatched_rows: Vec<u64>,
    pub outcomes: Vec<ImportOutcome>,
    pub dry_run: bool,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.unmatched_rows.is_empty() || self.outcomes.iter().any(|o| !o.is_success())
    }
}

/// Explicitly requested rows are passed through even when not ready, so the
/// coordinator reports why they cannot be imported.
fn select_candidates(scan: &ScanResult, rows: &[u64]) -> (Vec<CandidateRecord>, Vec<u64>) {
    if rows.is_empty() {
        return (scan.ready().cloned().collect(), Vec::new());
    }
    let wanted: BTreeSet<u64> = rows.iter().copied().collect();
    let selected: Vec<CandidateRecord> = scan
        .rows
        .iter()
        .filter(|candidate| wanted.contains(&candidate.row_number))
        .cloned()
        .collect();
    let found: BTreeSet<u64> = selected.iter().map(|c| c.row_number).collect();
    let unmatched = wanted.difference(&found).copied().collect();
    (selected, unmatched)
}

/// Whether any scan result carries a fetch-level error.
pub fn scans_failed(results: &[ScanResult]) -> bool {
    results.iter().any(|result| !result.is_ok())
}

pub fn bulk_failed(outcomes: &[BulkOutcome]) -> bool {
    outcomes.iter().any(|outcome| !outcome.is_success())
}
