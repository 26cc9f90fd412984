//! Locations of the fitted artifacts, read from an optional TOML file.
//!
//! ```toml
//! [artifacts]
//! model = "artifacts/model.toml"
//! scaler = "artifacts/scaler.toml"
//! ```
//!
//! Relative paths are resolved against the directory holding the config file, so a
//! config can travel together with its artifacts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "model.toml";
pub const DEFAULT_SCALER_PATH: &str = "scaler.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler: PathBuf::from(DEFAULT_SCALER_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub artifacts: ArtifactPaths,
}

impl ScanConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            config.artifacts.model = resolve_against(base, &config.artifacts.model);
            config.artifacts.scaler = resolve_against(base, &config.artifacts.scaler);
        }
        log::debug!(
            "Loaded config from {}: model={}, scaler={}",
            path.display(),
            config.artifacts.model.display(),
            config.artifacts.scaler.display()
        );
        Ok(config)
    }

    /// Command-line values win over file values.
    pub fn with_overrides(mut self, model: Option<PathBuf>, scaler: Option<PathBuf>) -> Self {
        if let Some(model) = model {
            self.artifacts.model = model;
        }
        if let Some(scaler) = scaler {
            self.artifacts.scaler = scaler;
        }
        self
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
