//! The default picker for harness runs that gathers the sources to run
//! from a TOML run request file.
use serde::Deserialize;
use std::path::Path;

use crate::errors;

/// A run request: which registered sources to load and which pre-filters
/// to apply.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Version of the harness this request is compatible with.
    pub ver: String,
    /// Names of the registered sources to run. Empty means every source.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Optional include pre-filter regex.
    pub include: Option<String>,
    /// Optional exclude pre-filter regex.
    pub exclude: Option<String>,
}

impl RunRequest {
    /// Read a run request from a TOML file. Ensures that the version
    /// number specified in the file matches the version of the harness.
    pub fn from_path(path: &Path) -> Result<Self, errors::EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|_| {
            errors::EngineError(format!("{} is missing.", path.to_string_lossy()))
        })?;

        let req: RunRequest = toml::from_str(&contents).map_err(|err| {
            errors::EngineError(format!(
                "Failed to parse {}: {}",
                path.to_string_lossy(),
                err
            ))
        })?;

        if env!("CARGO_PKG_VERSION") != req.ver {
            return Err(errors::EngineError(format!(
                "Version mismatch. Request requires: {}, harness version: {}.",
                req.ver,
                env!("CARGO_PKG_VERSION")
            )));
        }

        Ok(req)
    }
}
