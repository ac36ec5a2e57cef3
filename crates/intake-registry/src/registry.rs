#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::debug;

use intake_model::{
    ColumnMapping, SourceDefinition, SourceKey, SourceLocation, TargetCollection, TransformKind,
    WritebackColumns,
};

use crate::error::RegistryError;
use crate::manifest::{Manifest, ManifestColumn, ManifestSource, ManifestWriteback};
use crate::paths::registry_path_from_env;

const SCHEMA: &str = "lead-intake.source-registry";
const SCHEMA_VERSION: u32 = 1;

const BUILTIN_REGISTRY: &str = include_str!("../sources.toml");

/// Immutable set of source definitions, in declaration order.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceDefinition>,
    by_key: BTreeMap<SourceKey, usize>,
}

impl SourceRegistry {
    /// Parses and validates a registry manifest.
    ///
    /// `origin` names the document in error messages.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, RegistryError> {
        let manifest: Manifest = toml::from_str(contents).map_err(|e| RegistryError::Toml {
            origin: origin.to_string(),
            source: e,
        })?;
        Self::from_manifest(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        Self::from_toml_str(&contents, &path.display().to_string())
    }

    /// The registry compiled into the binary.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_REGISTRY, "<builtin>")
    }

    /// Resolution order: explicit path, `LEAD_INTAKE_REGISTRY`, builtin.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, RegistryError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match registry_path_from_env() {
            Some(path) => Self::load(&path),
            None => Self::builtin(),
        }
    }

    pub fn from_manifest(manifest: Manifest) -> Result<Self, RegistryError> {
        validate_header(&manifest)?;
        let mut sources = Vec::with_capacity(manifest.sources.len());
        let mut by_key = BTreeMap::new();
        for raw in manifest.sources {
            let definition = build_source(raw)?;
            if by_key.contains_key(&definition.key) {
                return Err(RegistryError::DuplicateSource {
                    key: definition.key.to_string(),
                });
            }
            debug!(
                source_key = %definition.key,
                columns = definition.columns.len(),
                "registered source"
            );
            by_key.insert(definition.key.clone(), sources.len());
            sources.push(definition);
        }
        Ok(Self { sources, by_key })
    }

    pub fn get(&self, key: &str) -> Result<&SourceDefinition, RegistryError> {
        SourceKey::new(key)
            .ok()
            .and_then(|key| self.by_key.get(&key))
            .map(|idx| &self.sources[*idx])
            .ok_or_else(|| RegistryError::UnknownSource {
                key: key.to_string(),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &SourceKey> {
        self.sources.iter().map(|source| &source.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDefinition> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn validate_header(manifest: &Manifest) -> Result<(), RegistryError> {
    if manifest.registry.schema != SCHEMA {
        return Err(RegistryError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.registry.schema),
        });
    }
    if manifest.registry.schema_version != SCHEMA_VERSION {
        return Err(RegistryError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.registry.schema_version
            ),
        });
    }
    Ok(())
}

fn build_source(raw: ManifestSource) -> Result<SourceDefinition, RegistryError> {
    let key = SourceKey::new(raw.key.clone())
        .map_err(|_| RegistryError::InvalidSourceKey { key: raw.key.clone() })?;
    if raw.columns.is_empty() {
        return Err(RegistryError::NoColumns {
            source_key: key.to_string(),
        });
    }

    let mut fields = BTreeSet::new();
    let mut columns = Vec::with_capacity(raw.columns.len());
    for column in raw.columns {
        let mapping = build_mapping(&key, column)?;
        if !fields.insert(mapping.target_field.clone()) {
            return Err(RegistryError::DuplicateField {
                source_key: key.to_string(),
                field: mapping.target_field,
            });
        }
        columns.push(mapping);
    }

    let writeback = build_writeback(&key, raw.writeback, &columns)?;
    let display_name = raw
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| key.to_string());

    Ok(SourceDefinition {
        key,
        display_name,
        location: SourceLocation {
            workbook: raw.workbook.trim().to_string(),
            tab: raw.tab.trim().to_string(),
        },
        columns,
        writeback,
    })
}

fn build_mapping(key: &SourceKey, column: ManifestColumn) -> Result<ColumnMapping, RegistryError> {
    let header = column.header.trim().to_string();
    let field = column.field.trim().to_string();
    if header.is_empty() || field.is_empty() {
        return Err(RegistryError::EmptyMapping {
            source_key: key.to_string(),
        });
    }
    let transform: TransformKind =
        column
            .transform
            .parse()
            .map_err(|_| RegistryError::UnknownTransform {
                source_key: key.to_string(),
                header: header.clone(),
                name: column.transform.clone(),
            })?;
    let collection = match column.collection.as_deref() {
        None => TargetCollection::default(),
        Some(name) => name.parse().map_err(|_| RegistryError::UnknownCollection {
            source_key: key.to_string(),
            header: header.clone(),
            name: name.to_string(),
        })?,
    };
    Ok(ColumnMapping {
        source_header: header,
        target_field: field,
        transform,
        required: column.required,
        collection,
    })
}

fn build_writeback(
    key: &SourceKey,
    raw: Option<ManifestWriteback>,
    columns: &[ColumnMapping],
) -> Result<WritebackColumns, RegistryError> {
    let writeback = match raw {
        Some(raw) => WritebackColumns {
            processed: raw.processed.trim().to_string(),
            processed_at: raw.processed_at.trim().to_string(),
            processed_by: raw.processed_by.trim().to_string(),
            lead_id: raw.lead_id.trim().to_string(),
        },
        None => WritebackColumns::default(),
    };

    let invalid = |message: String| RegistryError::InvalidWriteback {
        source_key: key.to_string(),
        message,
    };
    let mut seen = BTreeSet::new();
    for name in writeback.names() {
        if name.is_empty() {
            return Err(invalid("column name must not be empty".to_string()));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(invalid(format!("column {name} listed twice")));
        }
        if columns
            .iter()
            .any(|mapping| mapping.source_header.eq_ignore_ascii_case(name))
        {
            return Err(invalid(format!("column {name} is also a mapped header")));
        }
    }
    Ok(writeback)
}
