#![deny(unsafe_code)]

//! Raw TOML shape of the source registry, before validation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub registry: ManifestHeader,
    #[serde(default, rename = "source")]
    pub sources: Vec<ManifestSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestSource {
    pub key: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub workbook: String,
    pub tab: String,
    #[serde(default)]
    pub writeback: Option<ManifestWriteback>,
    #[serde(default, rename = "column")]
    pub columns: Vec<ManifestColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestWriteback {
    pub processed: String,
    pub processed_at: String,
    pub processed_by: String,
    pub lead_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestColumn {
    pub header: String,
    pub field: String,
    #[serde(default = "default_transform")]
    pub transform: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub collection: Option<String>,
}

fn default_transform() -> String {
    "none".to_string()
}
