use std::io::Write;

use intake_model::{TargetCollection, TransformKind};
use intake_registry::{RegistryError, SourceRegistry};

const HEADER: &str = r#"
[registry]
schema = "lead-intake.source-registry"
schema_version = 1
"#;

fn registry(body: &str) -> Result<SourceRegistry, RegistryError> {
    SourceRegistry::from_toml_str(&format!("{HEADER}{body}"), "test")
}

#[test]
fn minimal_source_gets_defaults() {
    let registry = registry(
        r#"
[[source]]
key = "expo"
workbook = "events"
tab = "expo"

[[source.column]]
header = "Phone"
field = "number"
transform = "normalizePhone"
required = true

[[source.column]]
header = "Notes"
field = "notes"
collection = "flow"
"#,
    )
    .unwrap();

    let expo = registry.get("expo").unwrap();
    assert_eq!(expo.display_name, "expo");
    assert_eq!(expo.writeback.processed, "processed");
    assert_eq!(expo.columns[1].transform, TransformKind::None);
    assert_eq!(expo.columns[0].collection, TargetCollection::Core);
    assert_eq!(expo.columns[1].collection, TargetCollection::Flow);
    assert_eq!(expo.required_headers().collect::<Vec<_>>(), vec!["Phone"]);
}

#[test]
fn unknown_transform_fails_at_load() {
    let err = registry(
        r#"
[[source]]
key = "expo"
workbook = "events"
tab = "expo"

[[source.column]]
header = "Phone"
field = "number"
transform = "e164"
"#,
    )
    .unwrap_err();
    match err {
        RegistryError::UnknownTransform {
            source_key,
            header,
            name,
        } => {
            assert_eq!(source_key, "expo");
            assert_eq!(header, "Phone");
            assert_eq!(name, "e164");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_source_keys_are_rejected() {
    let source = r#"
[[source]]
key = "expo"
workbook = "events"
tab = "expo"

[[source.column]]
header = "Phone"
field = "number"
"#;
    let err = registry(&format!("{source}{source}")).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateSource { ref key } if key == "expo"));
}

#[test]
fn duplicate_target_field_is_rejected() {
    let err = registry(
        r#"
[[source]]
key = "expo"
workbook = "events"
tab = "expo"

[[source.column]]
header = "Phone"
field = "number"

[[source.column]]
header = "Mobile"
field = "number"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateField { ref field, .. } if field == "number"));
}

#[test]
fn writeback_column_may_not_shadow_mapped_header() {
    let err = registry(
        r#"
[[source]]
key = "expo"
workbook = "events"
tab = "expo"

[source.writeback]
processed = "Phone"
processed_at = "at"
processed_by = "by"
lead_id = "lead"

[[source.column]]
header = "Phone"
field = "number"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidWriteback { .. }));
}

#[test]
fn unsupported_schema_is_rejected() {
    let err = SourceRegistry::from_toml_str(
        r#"
[registry]
schema = "something-else"
schema_version = 1
"#,
        "test",
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidManifest { .. }));
}

#[test]
fn misspelled_keys_fail_to_parse() {
    let err = registry(
        r#"
[[source]]
key = "expo"
workbook = "events"
tab = "expo"

[[source.column]]
header = "Phone"
field = "number"
requried = true
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::Toml { .. }));
}

#[test]
fn load_reads_registry_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{HEADER}
[[source]]
key = \"expo\"
display_name = \"Expo Leads\"
workbook = \"events\"
tab = \"expo\"

[[source.column]]
header = \"Phone\"
field = \"number\"
"
    )
    .unwrap();
    let registry = SourceRegistry::load(file.path()).unwrap();
    assert_eq!(registry.get("expo").unwrap().display_name, "Expo Leads");
    assert_eq!(registry.keys().count(), 1);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SourceRegistry::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
}
