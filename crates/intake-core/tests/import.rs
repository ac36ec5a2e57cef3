use std::sync::Arc;
use std::thread;

use intake_core::{
    ImportCoordinator, LeadStore, MemoryLeadStore, MemoryRowSource, PROCESSED_MARKER, RowLocks,
    Scanner,
};
use intake_model::{
    Actor, CandidateRecord, ImportError, NotImportableReason, RawRow, SheetData, SourceKey,
    SourceLocation,
};
use intake_registry::SourceRegistry;

struct Fixture {
    registry: SourceRegistry,
    source: MemoryRowSource,
    store: MemoryLeadStore,
    tkw: SourceLocation,
}

impl Fixture {
    fn with_rows(rows: Vec<RawRow>) -> Self {
        let registry = SourceRegistry::builtin().unwrap();
        let tkw = registry.get("tkw").unwrap().location.clone();
        let sheet = SheetData {
            headers: ["company_name", "NUMBER", "lead_id"].map(String::from).to_vec(),
            rows,
        };
        Self {
            source: MemoryRowSource::new().with_tab(tkw.clone(), sheet),
            store: MemoryLeadStore::new(),
            registry,
            tkw,
        }
    }

    fn ready(&self) -> Vec<CandidateRecord> {
        let existing = self.store.list_leads().unwrap();
        Scanner::new(&self.registry, &self.source)
            .scan(&SourceKey::new("tkw").unwrap(), &existing)
            .ready()
            .cloned()
            .collect()
    }

    fn coordinator(&self) -> ImportCoordinator<'_> {
        ImportCoordinator::new(&self.registry, &self.source, &self.store)
    }

    fn row(&self, row_number: u64) -> RawRow {
        self.source
            .sheet(&self.tkw)
            .unwrap()
            .row(row_number)
            .cloned()
            .unwrap()
    }
}

fn row(row_number: u64, company: &str, phone: &str) -> RawRow {
    RawRow::new(row_number)
        .with_cell("company_name", company)
        .with_cell("NUMBER", phone)
        .with_cell("lead_id", format!("R{row_number}"))
}

fn three_rows() -> Vec<RawRow> {
    vec![
        row(1, "acme", "9000000001"),
        row(2, "beta", "9000000002"),
        row(3, "gamma", "9000000003"),
    ]
}

fn actor() -> Actor {
    Actor::new("priya").unwrap()
}

#[test]
fn import_creates_lead_and_marks_row() {
    let fixture = Fixture::with_rows(three_rows());
    let candidates = fixture.ready();

    let lead = fixture
        .coordinator()
        .import_row(&candidates[0], &actor())
        .unwrap();

    assert_eq!(lead.lead_id.as_str(), "LD-000001");
    assert_eq!(lead.field("companyName"), Some("Acme"));
    assert_eq!(lead.source_row_id.as_deref(), Some("R1"));
    assert_eq!(lead.created_by, actor());

    let marked = fixture.row(1);
    assert_eq!(marked.text("processed").as_deref(), Some(PROCESSED_MARKER));
    assert_eq!(marked.text("processed_by").as_deref(), Some("priya"));
    assert_eq!(marked.text("lead_ref").as_deref(), Some("LD-000001"));
    assert!(marked.text("processed_at").is_some_and(|at| !at.is_empty()));
}

#[test]
fn failed_writeback_yields_partial_import_and_batch_continues() {
    let fixture = Fixture::with_rows(three_rows());
    fixture.source.fail_writeback(fixture.tkw.clone(), 2);
    let candidates = fixture.ready();
    assert_eq!(candidates.len(), 3);

    let outcomes = fixture.coordinator().import_rows(&candidates, &actor());

    assert!(outcomes[0].is_success());
    assert!(outcomes[1].is_partial());
    assert!(outcomes[2].is_success());

    let error = outcomes[1].result.as_ref().unwrap_err();
    assert!(!error.is_retryable());
    assert!(error.requires_rescan());
    let partial_lead = error.created_lead().unwrap();
    let stored = fixture.store.leads();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().any(|lead| lead.lead_id == partial_lead.lead_id));
    assert!(fixture.row(2).text("processed").is_none());
}

#[test]
fn reimporting_a_marked_row_is_rejected() {
    let fixture = Fixture::with_rows(three_rows());
    let candidates = fixture.ready();
    let coordinator = fixture.coordinator();

    coordinator.import_row(&candidates[0], &actor()).unwrap();
    let second = coordinator.import_row(&candidates[0], &actor());

    match second {
        Err(ImportError::AlreadyImported { lead_id }) => {
            assert_eq!(lead_id.as_deref(), Some("LD-000001"));
        }
        other => panic!("expected AlreadyImported, got {other:?}"),
    }
    assert_eq!(fixture.store.len(), 1);
}

#[test]
fn concurrent_imports_of_one_row_create_one_lead() {
    let fixture = Fixture::with_rows(three_rows());
    let candidate = fixture.ready().remove(0);
    let locks = Arc::new(RowLocks::new());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = fixture.coordinator().with_locks(Arc::clone(&locks));
                let candidate = &candidate;
                scope.spawn(move || coordinator.import_row(candidate, &actor()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ImportError::AlreadyImported { .. }))
    );
    assert_eq!(fixture.store.len(), 1);
}

#[test]
fn invalid_and_duplicate_candidates_are_not_importable() {
    let fixture = Fixture::with_rows(three_rows());
    let mut invalid = fixture.ready().remove(0);
    invalid.is_valid = false;
    let mut duplicate = fixture.ready().remove(1);
    duplicate.is_duplicate = true;

    let coordinator = fixture.coordinator();
    assert!(matches!(
        coordinator.import_row(&invalid, &actor()),
        Err(ImportError::NotImportable {
            reason: NotImportableReason::Invalid
        })
    ));
    assert!(matches!(
        coordinator.import_row(&duplicate, &actor()),
        Err(ImportError::NotImportable {
            reason: NotImportableReason::Duplicate
        })
    ));
    assert!(fixture.store.is_empty());
}

#[test]
fn row_removed_since_scan_is_reported() {
    let fixture = Fixture::with_rows(three_rows());
    let candidates = fixture.ready();
    fixture.source.insert_tab(
        fixture.tkw.clone(),
        SheetData {
            headers: ["company_name", "NUMBER", "lead_id"].map(String::from).to_vec(),
            rows: vec![row(1, "acme", "9000000001")],
        },
    );

    let result = fixture.coordinator().import_row(&candidates[2], &actor());
    assert!(matches!(result, Err(ImportError::RowMissing { row_number: 3 })));
    assert!(fixture.store.is_empty());
}

#[test]
fn row_replaced_since_scan_is_reported() {
    let fixture = Fixture::with_rows(three_rows());
    let candidates = fixture.ready();
    // Row 2 now holds what used to be row 3.
    let shifted = RawRow::new(2)
        .with_cell("company_name", "gamma")
        .with_cell("NUMBER", "9000000003")
        .with_cell("lead_id", "R3");
    fixture.source.insert_tab(
        fixture.tkw.clone(),
        SheetData {
            headers: ["company_name", "NUMBER", "lead_id"].map(String::from).to_vec(),
            rows: vec![row(1, "acme", "9000000001"), shifted],
        },
    );

    let result = fixture.coordinator().import_row(&candidates[1], &actor());
    assert!(matches!(result, Err(ImportError::RowChanged { row_number: 2 })));
}

#[test]
fn rescan_after_partial_import_flags_the_created_lead() {
    let fixture = Fixture::with_rows(three_rows());
    fixture.source.fail_writeback(fixture.tkw.clone(), 1);
    let candidates = fixture.ready();

    let error = fixture
        .coordinator()
        .import_row(&candidates[0], &actor())
        .unwrap_err();
    assert!(error.requires_rescan());

    let rescanned = fixture.ready();
    assert!(rescanned.iter().all(|candidate| candidate.row_number != 1));
    assert_eq!(fixture.store.len(), 1);
}

#[test]
fn row_inserted_above_an_unkeyed_row_is_reported() {
    let registry = SourceRegistry::builtin().unwrap();
    let referral = registry.get("referral").unwrap().location.clone();
    let headers = ["firm", "mobile", "referred_by"].map(String::from).to_vec();
    let referral_row = |row_number: u64, firm: &str, mobile: &str| {
        RawRow::new(row_number)
            .with_cell("firm", firm)
            .with_cell("mobile", mobile)
            .with_cell("referred_by", "meera")
    };
    let source = MemoryRowSource::new().with_tab(
        referral.clone(),
        SheetData {
            headers: headers.clone(),
            rows: vec![
                referral_row(1, "alpha", "9100000001"),
                referral_row(2, "beta", "9100000002"),
            ],
        },
    );
    let store = MemoryLeadStore::new();
    let scanned = Scanner::new(&registry, &source).scan(&SourceKey::new("referral").unwrap(), &[]);
    let beta = scanned.ready().find(|c| c.row_number == 2).cloned().unwrap();

    source.insert_tab(
        referral.clone(),
        SheetData {
            headers,
            rows: vec![
                referral_row(1, "alpha", "9100000001"),
                referral_row(2, "newco", "9100000009"),
                referral_row(3, "beta", "9100000002"),
            ],
        },
    );

    let result = ImportCoordinator::new(&registry, &source, &store).import_row(&beta, &actor());
    assert!(matches!(result, Err(ImportError::RowChanged { row_number: 2 })));
    assert!(store.is_empty());
    let sheet = source.sheet(&referral).unwrap();
    for row_number in 1..=3 {
        assert!(sheet.row(row_number).unwrap().text("processed").is_none());
    }
}

#[test]
fn unreachable_source_is_retryable() {
    let fixture = Fixture::with_rows(three_rows());
    let candidates = fixture.ready();
    fixture.source.set_unreachable(fixture.tkw.clone());

    let error = fixture
        .coordinator()
        .import_row(&candidates[0], &actor())
        .unwrap_err();
    assert!(matches!(error, ImportError::Source(_)));
    assert!(error.is_retryable());
}

#[test]
fn store_failure_leaves_row_unmarked() {
    let fixture = Fixture::with_rows(three_rows());
    let candidates = fixture.ready();
    fixture.store.set_unavailable(true);

    let error = fixture
        .coordinator()
        .import_row(&candidates[0], &actor())
        .unwrap_err();
    assert!(matches!(error, ImportError::Store(_)));
    assert!(fixture.row(1).text("processed").is_none());
}
