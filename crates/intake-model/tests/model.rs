//! Tests for intake-model types.

use intake_model::{
    BulkAction, CandidateId, CandidateRecord, DuplicateRef, ImportError, LeadId, NotImportableReason,
    ScanError, ScanResult, ScanStats, SourceError, SourceKey, TargetCollection,
};

fn candidate(row: u64, valid: bool, duplicate: bool) -> CandidateRecord {
    let key = SourceKey::new("tkw").unwrap();
    let mut record = CandidateRecord::new(CandidateId::derive(&key, &row.to_string()), key, row);
    record.insert_field(TargetCollection::Core, "companyName", "Acme Corp");
    if !valid {
        record.is_valid = false;
        record.errors.push("missing required field: number".to_string());
    }
    if duplicate {
        record.mark_duplicate(DuplicateRef::Lead {
            lead_id: LeadId::new("LD-000001").unwrap(),
        });
    }
    record
}

#[test]
fn stats_count_each_status_once() {
    let rows = vec![
        candidate(1, true, false),
        candidate(2, true, false),
        candidate(3, false, false),
        candidate(4, true, true),
    ];
    let stats = ScanStats::from_candidates(&rows);
    assert_eq!(stats.ready, 2);
    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.duplicate, 1);
    assert_eq!(stats.total(), 4);
    insta::assert_json_snapshot!(stats, @r#"
    {
      "ready": 2,
      "invalid": 1,
      "duplicate": 1,
      "already_imported": 0
    }
    "#);
}

#[test]
fn invalid_takes_precedence_over_duplicate() {
    let mut record = candidate(1, false, false);
    record.mark_duplicate(DuplicateRef::Lead {
        lead_id: LeadId::new("LD-000002").unwrap(),
    });
    let stats = ScanStats::from_candidates(&[record]);
    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.duplicate, 0);
}

#[test]
fn missing_headers_failure_populates_meta() {
    let result = ScanResult::failed(
        SourceKey::new("tkw").unwrap(),
        ScanError::MissingHeaders {
            headers: vec!["NUMBER".to_string()],
        },
    );
    assert!(!result.is_ok());
    assert!(result.rows.is_empty());
    assert_eq!(
        result.meta.as_ref().map(|meta| meta.missing_headers.clone()),
        Some(vec!["NUMBER".to_string()])
    );
    insta::assert_json_snapshot!(result.error, @r#"
    {
      "kind": "missing_headers",
      "headers": [
        "NUMBER"
      ]
    }
    "#);
}

#[test]
fn retryability_follows_error_kind() {
    let not_importable = ImportError::NotImportable {
        reason: NotImportableReason::Invalid,
    };
    assert!(!not_importable.is_retryable());
    assert!(!ImportError::AlreadyImported { lead_id: None }.is_retryable());
    let source = ImportError::from(SourceError::Unreachable {
        location: "intake/tkw".to_string(),
        message: "timeout".to_string(),
    });
    assert!(source.is_retryable());

    assert!(
        ScanError::SourceUnreachable {
            message: "timeout".to_string()
        }
        .is_retryable()
    );
    assert!(
        !ScanError::UnknownSource {
            key: "nope".to_string()
        }
        .is_retryable()
    );
}

#[test]
fn already_imported_message_names_lead() {
    let err = ImportError::AlreadyImported {
        lead_id: Some("LD-000007".to_string()),
    };
    assert_eq!(err.to_string(), "row already imported as LD-000007");
}

#[test]
fn bulk_actions_keep_their_shape_on_the_wire() {
    let action = BulkAction::ScheduleNextAction {
        action: "call back".to_string(),
        date: "2026-03-01".to_string(),
    };
    insta::assert_json_snapshot!(action, @r#"
    {
      "kind": "schedule_next_action",
      "action": "call back",
      "date": "2026-03-01"
    }
    "#);

    let json = serde_json::to_string(&action).unwrap();
    assert_eq!(serde_json::from_str::<BulkAction>(&json).unwrap(), action);

    let parsed: BulkAction =
        serde_json::from_str(r#"{"kind":"move_stage","stage":"qualified"}"#).unwrap();
    assert_eq!(
        parsed,
        BulkAction::MoveStage {
            stage: "qualified".to_string()
        }
    );
}

#[test]
fn in_batch_duplicate_reference_carries_the_row() {
    let key = SourceKey::new("tkw").unwrap();
    let of = DuplicateRef::Candidate {
        candidate_id: CandidateId::derive(&key, "R1"),
        row_number: 1,
    };
    let json = serde_json::to_value(&of).unwrap();
    assert_eq!(json["kind"], "candidate");
    assert_eq!(json["row_number"], 1);
    assert_eq!(serde_json::from_value::<DuplicateRef>(json).unwrap(), of);
}

#[test]
fn partial_import_asks_for_a_rescan_instead_of_a_retry() {
    let changed = ImportError::RowChanged { row_number: 4 };
    assert!(changed.requires_rescan());
    assert!(!changed.is_retryable());

    let source = ImportError::from(SourceError::Unreachable {
        location: "intake/tkw".to_string(),
        message: "timeout".to_string(),
    });
    assert!(!source.requires_rescan());
}
