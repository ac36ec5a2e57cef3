use std::collections::BTreeMap;

use chrono::Utc;
use intake_core::LeadStore;
use intake_ingest::JsonLeadStore;
use intake_model::{Actor, LeadId, LeadPatch, NewLead, SourceKey, StoreError};

fn new_lead(phone: &str) -> NewLead {
    NewLead {
        source_key: SourceKey::new("tkw").unwrap(),
        source_row_id: Some("R1".to_string()),
        core: BTreeMap::from([("number".to_string(), phone.to_string())]),
        flow: BTreeMap::new(),
        created_at: Utc::now(),
        created_by: Actor::new("priya").unwrap(),
    }
}

#[test]
fn leads_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm/leads.json");

    let store = JsonLeadStore::open(&path).unwrap();
    let first = store.create_lead(new_lead("9000000001")).unwrap();
    let second = store.create_lead(new_lead("9000000002")).unwrap();
    assert_eq!(first.lead_id.as_str(), "LD-000001");
    assert_eq!(second.lead_id.as_str(), "LD-000002");
    assert_eq!(first.stage, "new");

    let reopened = JsonLeadStore::open(&path).unwrap();
    assert_eq!(reopened.list_leads().unwrap().len(), 2);
    let third = reopened.create_lead(new_lead("9000000003")).unwrap();
    assert_eq!(third.lead_id.as_str(), "LD-000003");
}

#[test]
fn mutate_updates_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leads.json");
    let store = JsonLeadStore::open(&path).unwrap();
    let lead = store.create_lead(new_lead("9000000001")).unwrap();

    let updated = store
        .mutate_lead(&lead.lead_id, &LeadPatch::Owner("meera".to_string()))
        .unwrap();
    assert_eq!(updated.owner.as_deref(), Some("meera"));

    let reopened = JsonLeadStore::open(&path).unwrap();
    assert_eq!(
        reopened.list_leads().unwrap()[0].owner.as_deref(),
        Some("meera")
    );
}

#[test]
fn unknown_lead_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonLeadStore::open(dir.path().join("leads.json")).unwrap();
    let err = store
        .mutate_lead(
            &LeadId::new("LD-999999").unwrap(),
            &LeadPatch::Stage("won".to_string()),
        )
        .unwrap_err();
    assert_eq!(err, StoreError::NotFound("LD-999999".to_string()));
}

#[test]
fn corrupt_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leads.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(JsonLeadStore::open(&path).is_err());
}
