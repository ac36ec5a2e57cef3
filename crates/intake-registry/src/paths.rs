//! Registry path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the builtin source registry.
pub const REGISTRY_ENV_VAR: &str = "LEAD_INTAKE_REGISTRY";

/// Registry path from `LEAD_INTAKE_REGISTRY`, if set and non-empty.
pub fn registry_path_from_env() -> Option<PathBuf> {
    std::env::var_os(REGISTRY_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
