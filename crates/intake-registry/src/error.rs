#![deny(unsafe_code)]

use std::path::PathBuf;

/// Configuration errors. Raised while loading the registry, never while
/// processing rows.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML registry {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid registry: {message}")]
    InvalidManifest { message: String },

    #[error("unknown source: {key}")]
    UnknownSource { key: String },

    #[error("invalid source key: {key:?}")]
    InvalidSourceKey { key: String },

    #[error("duplicate source key: {key}")]
    DuplicateSource { key: String },

    #[error("source {source_key} has no column mappings")]
    NoColumns { source_key: String },

    #[error("source {source_key} has a column mapping with an empty header or field")]
    EmptyMapping { source_key: String },

    #[error("source {source_key}, column {header}: unknown transform {name:?}")]
    UnknownTransform {
        source_key: String,
        header: String,
        name: String,
    },

    #[error("source {source_key}, column {header}: unknown collection {name:?}")]
    UnknownCollection {
        source_key: String,
        header: String,
        name: String,
    },

    #[error("source {source_key} maps field {field} more than once")]
    DuplicateField { source_key: String, field: String },

    #[error("source {source_key} has invalid writeback columns: {message}")]
    InvalidWriteback { source_key: String, message: String },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
