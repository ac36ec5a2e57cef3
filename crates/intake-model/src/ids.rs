#![deny(unsafe_code)]

use std::fmt;

use sha2::{Digest, Sha256};

use crate::ModelError;

/// Unique key of a registered source (e.g. `tkw`).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSourceKey(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a canonical lead, assigned by the lead store.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LeadId(String);

impl LeadId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidLeadId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user on whose behalf an import or mutation runs.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Actor(String);

impl Actor {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidActor(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deterministic candidate identifier.
///
/// Derived from the source key and the row's source-side identifier, so an
/// unchanged row keeps its id across rescans. Rendered as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateId([u8; 16]);

impl CandidateId {
    pub fn derive(source_key: &SourceKey, row_identifier: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source_key.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(row_identifier.trim().as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        Self::from_first_16_bytes_of_sha256(digest)
    }

    pub fn from_first_16_bytes_of_sha256(digest: [u8; 32]) -> Self {
        let mut out = [0u8; 16];
        out.copy_from_slice(&digest[..16]);
        Self(out)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl serde::Serialize for CandidateId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for CandidateId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 16 {
            return Err(serde::de::Error::custom("CandidateId must be 16 bytes"));
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_key_rejects_blank() {
        assert!(SourceKey::new("   ").is_err());
        assert_eq!(SourceKey::new(" tkw ").unwrap().as_str(), "tkw");
    }

    #[test]
    fn candidate_id_is_stable_per_source_and_row() {
        let tkw = SourceKey::new("tkw").unwrap();
        let web = SourceKey::new("web").unwrap();
        assert_eq!(CandidateId::derive(&tkw, "R1"), CandidateId::derive(&tkw, "R1"));
        assert_ne!(CandidateId::derive(&tkw, "R1"), CandidateId::derive(&tkw, "R2"));
        assert_ne!(CandidateId::derive(&tkw, "R1"), CandidateId::derive(&web, "R1"));
    }

    #[test]
    fn candidate_id_serializes_as_hex() {
        let id = CandidateId::derive(&SourceKey::new("tkw").unwrap(), "7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json.len(), 34);
        let round: CandidateId = serde_json::from_str(&json).unwrap();
        assert_eq!(round, id);
    }
}
