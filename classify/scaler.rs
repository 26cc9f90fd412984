//! Feature-wise standardization fitted at training time.

use super::ModelUnavailableError;
use crate::features::{FEATURE_COUNT, FeatureSchema};
use ndarray::{Array1, ArrayView1, aview1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

const ARTIFACT: &str = "scaler";

/// `(x - mean) / scale`, column by column. Never refitted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub schema: FeatureSchema,
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn new(
        schema: FeatureSchema,
        mean: [f64; FEATURE_COUNT],
        scale: [f64; FEATURE_COUNT],
    ) -> Self {
        Self {
            schema,
            mean,
            scale,
        }
    }

    pub fn transform(&self, x: ArrayView1<f64>) -> Array1<f64> {
        (&x - &aview1(&self.mean)) / &aview1(&self.scale)
    }

    /// Rejects layouts from another schema and parameters that would poison every
    /// prediction (non-finite values, zero or negative scales).
    pub fn validate(&self) -> Result<(), ModelUnavailableError> {
        ModelUnavailableError::check_schema(ARTIFACT, &self.schema)?;
        for (i, (&mean, &scale)) in self.mean.iter().zip(self.scale.iter()).enumerate() {
            let name = &self.schema.features[i];
            if !mean.is_finite() {
                return Err(ModelUnavailableError::invalid(
                    ARTIFACT,
                    format!("mean for '{name}' is not finite ({mean})"),
                ));
            }
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ModelUnavailableError::invalid(
                    ARTIFACT,
                    format!("scale for '{name}' must be a positive finite number, found {scale}"),
                ));
            }
        }
        Ok(())
    }

    /// Saves the scaler in the human-readable TOML artifact format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelUnavailableError> {
        let path = path.as_ref();
        let toml_string = toml::to_string_pretty(self)?;
        let io_err = |source| ModelUnavailableError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = BufWriter::new(fs::File::create(path).map_err(io_err)?);
        file.write_all(toml_string.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(())
    }

    /// Loads and validates a scaler artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelUnavailableError> {
        let path = path.as_ref();
        log::info!("Loading scaler artifact from {}", path.display());
        let toml_string = fs::read_to_string(path).map_err(|source| ModelUnavailableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scaler: Self =
            toml::from_str(&toml_string).map_err(|source| ModelUnavailableError::TomlParse {
                path: path.to_path_buf(),
                source,
            })?;
        scaler.validate()?;
        Ok(scaler)
    }
}
