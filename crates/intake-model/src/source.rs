//! Declarative source definitions.
//!
//! A [`SourceDefinition`] describes one external tab: where it lives, how each
//! raw column maps onto a canonical lead field, and which columns receive the
//! writeback marker after import. Definitions are built once by the registry
//! and never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::ids::SourceKey;

/// Named value normalization applied to a raw cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "titleCase")]
    TitleCase,
    #[serde(rename = "lowerCase")]
    LowerCase,
    #[serde(rename = "normalizePhone")]
    NormalizePhone,
    #[serde(rename = "parseInt")]
    ParseInt,
}

impl TransformKind {
    pub const ALL: [TransformKind; 5] = [
        Self::None,
        Self::TitleCase,
        Self::LowerCase,
        Self::NormalizePhone,
        Self::ParseInt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TitleCase => "titleCase",
            Self::LowerCase => "lowerCase",
            Self::NormalizePhone => "normalizePhone",
            Self::ParseInt => "parseInt",
        }
    }
}

impl FromStr for TransformKind {
    type Err = TransformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "none" => Ok(Self::None),
            "titleCase" | "title_case" => Ok(Self::TitleCase),
            "lowerCase" | "lower_case" => Ok(Self::LowerCase),
            "normalizePhone" | "normalize_phone" => Ok(Self::NormalizePhone),
            "parseInt" | "parse_int" => Ok(Self::ParseInt),
            other => Err(TransformError::Unknown {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the canonical lead a mapped value lands in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCollection {
    /// Lead core fields (company, contact, phone).
    #[default]
    Core,
    /// Flow/activity fields (enquiry details, quantities, remarks).
    Flow,
}

impl TargetCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Flow => "flow",
        }
    }
}

impl FromStr for TargetCollection {
    type Err = TransformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "core" | "lead" => Ok(Self::Core),
            "flow" | "activity" => Ok(Self::Flow),
            _ => Err(TransformError::UnknownCollection {
                name: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Raw column name in the source tab.
    pub source_header: String,
    /// Canonical lead attribute name.
    pub target_field: String,
    pub transform: TransformKind,
    pub required: bool,
    pub collection: TargetCollection,
}

/// Opaque handle to the backing tab of a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub workbook: String,
    pub tab: String,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workbook, self.tab)
    }
}

/// Column names written back onto an imported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritebackColumns {
    pub processed: String,
    pub processed_at: String,
    pub processed_by: String,
    pub lead_id: String,
}

impl WritebackColumns {
    pub fn names(&self) -> [&str; 4] {
        [
            self.processed.as_str(),
            self.processed_at.as_str(),
            self.processed_by.as_str(),
            self.lead_id.as_str(),
        ]
    }
}

impl Default for WritebackColumns {
    fn default() -> Self {
        Self {
            processed: "processed".to_string(),
            processed_at: "processed_at".to_string(),
            processed_by: "processed_by".to_string(),
            lead_id: "lead_ref".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub key: SourceKey,
    pub display_name: String,
    pub location: SourceLocation,
    pub columns: Vec<ColumnMapping>,
    pub writeback: WritebackColumns,
}

impl SourceDefinition {
    /// Source headers of all required mappings, in mapping order.
    pub fn required_headers(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|mapping| mapping.required)
            .map(|mapping| mapping.source_header.as_str())
    }

    pub fn mapping_for_field(&self, target_field: &str) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|mapping| mapping.target_field == target_field)
    }
}
