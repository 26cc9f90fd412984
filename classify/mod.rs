//! # Classifier Adapter
//!
//! Wraps the two fitted artifacts, the standard scaler and the binary classifier,
//! behind a single `predict` over an assembled [`FeatureVector`]. Both artifacts are
//! loaded once at process start and shared read-only afterwards.

use crate::features::{FEATURE_COUNT, FeatureSchema, FeatureVector};
use crate::types::DiabetesLabel;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod model;
pub mod scaler;

use model::TrainedClassifier;
use scaler::StandardScaler;

/// Failure to obtain a usable artifact. Fatal for the serving process: artifacts are
/// static for its lifetime and are never retried.
#[derive(Error, Debug)]
pub enum ModelUnavailableError {
    #[error("Failed to read artifact file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML artifact '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize artifact to TOML format: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error(
        "The {artifact} artifact was fitted on feature schema v{found_version} {found:?}, but this build expects v{expected_version} {expected:?}. Refit the artifact against the current schema."
    )]
    SchemaMismatch {
        artifact: &'static str,
        found_version: u32,
        found: Vec<String>,
        expected_version: u32,
        expected: Vec<String>,
    },
    #[error("The {artifact} artifact is malformed: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
}

impl ModelUnavailableError {
    pub(crate) fn check_schema(
        artifact: &'static str,
        schema: &FeatureSchema,
    ) -> Result<(), ModelUnavailableError> {
        if schema.is_canonical() {
            return Ok(());
        }
        let expected = FeatureSchema::canonical();
        Err(ModelUnavailableError::SchemaMismatch {
            artifact,
            found_version: schema.version,
            found: schema.features.clone(),
            expected_version: expected.version,
            expected: expected.features,
        })
    }

    pub(crate) fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        ModelUnavailableError::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

/// Anything that can turn an assembled feature vector into a verdict.
pub trait Classifier {
    fn predict(&self, features: &FeatureVector) -> Result<DiabetesLabel, ModelUnavailableError>;
}

/// The artifact-backed classifier: scale, then classify.
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    scaler: StandardScaler,
    model: TrainedClassifier,
}

impl ClassifierAdapter {
    /// Pairs a scaler with a classifier. Both are validated, so an empty forest, a
    /// cyclic tree or a zero scale never reaches `predict`.
    pub fn new(
        scaler: StandardScaler,
        model: TrainedClassifier,
    ) -> Result<Self, ModelUnavailableError> {
        scaler.validate()?;
        model.validate()?;
        Ok(Self { scaler, model })
    }

    /// Loads and validates both artifacts. Any failure here should stop the process.
    pub fn load(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, ModelUnavailableError> {
        let scaler = StandardScaler::load(scaler_path)?;
        let model = TrainedClassifier::load(model_path)?;
        log::info!(
            "Classifier ready: {} over {} standardized features",
            model.kind_name(),
            FEATURE_COUNT
        );
        Ok(Self { scaler, model })
    }

    /// The classifier's positive-class probability for one feature vector.
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let x = features.to_array1();
        let scaled = self.scaler.transform(x.view());
        self.model.predict_proba(scaled.view())
    }
}

impl Classifier for ClassifierAdapter {
    fn predict(&self, features: &FeatureVector) -> Result<DiabetesLabel, ModelUnavailableError> {
        let probability = self.predict_proba(features);
        log::debug!("Classifier positive-class probability: {probability:.4}");
        Ok(DiabetesLabel::from_probability(probability))
    }
}
