#![deny(unsafe_code)]

pub mod error;
pub mod manifest;
pub mod paths;
pub mod registry;

pub use crate::error::RegistryError;
pub use crate::paths::{REGISTRY_ENV_VAR, registry_path_from_env};
pub use crate::registry::SourceRegistry;
