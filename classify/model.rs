//! The pre-trained binary classifier artifact.

use super::ModelUnavailableError;
use crate::features::{FEATURE_COUNT, FeatureSchema};
use ndarray::{ArrayView1, aview1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

// --- Public Data Structures ---
// These structs define the public, human-readable format of the pre-trained
// classifier when serialized to a TOML file.

const ARTIFACT: &str = "classifier";

/// One node of a binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Readings `<= threshold` on the (scaled) `feature` column go to `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Fraction of positive training samples that reached this leaf.
    Leaf { probability: f64 },
}

/// A tree stored as a flat node list rooted at index 0. Children always point to a
/// higher index, which keeps every traversal finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn leaf_probability(&self, x: &ArrayView1<f64>) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => index = if x[feature] <= threshold { left } else { right },
                TreeNode::Leaf { probability } => return probability,
            }
        }
    }

    fn validate(&self, tree_index: usize) -> Result<(), ModelUnavailableError> {
        if self.nodes.is_empty() {
            return Err(ModelUnavailableError::invalid(
                ARTIFACT,
                format!("tree {tree_index} has no nodes"),
            ));
        }
        let node_count = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(ModelUnavailableError::invalid(
                            ARTIFACT,
                            format!(
                                "tree {tree_index} node {i} splits on feature {feature}, but only {FEATURE_COUNT} exist"
                            ),
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelUnavailableError::invalid(
                            ARTIFACT,
                            format!("tree {tree_index} node {i} has a non-finite threshold"),
                        ));
                    }
                    for child in [left, right] {
                        if child <= i || child >= node_count {
                            return Err(ModelUnavailableError::invalid(
                                ARTIFACT,
                                format!(
                                    "tree {tree_index} node {i} points to child {child}; children must lie in ({i}, {node_count})"
                                ),
                            ));
                        }
                    }
                }
                TreeNode::Leaf { probability } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(ModelUnavailableError::invalid(
                            ARTIFACT,
                            format!(
                                "tree {tree_index} leaf {i} has probability {probability} outside [0, 1]"
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// The supported model families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    /// An averaged ensemble of decision trees.
    Forest { trees: Vec<DecisionTree> },
    /// `sigmoid(intercept + coefficients · x)`.
    Logistic {
        intercept: f64,
        coefficients: [f64; FEATURE_COUNT],
    },
}

/// The top-level, self-contained classifier artifact.
/// This is the structure that gets saved to and loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedClassifier {
    /// The feature layout the model was fitted on.
    pub schema: FeatureSchema,
    pub model: ClassifierModel,
}

impl TrainedClassifier {
    /// Positive-class probability for one already-scaled feature vector.
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> f64 {
        match &self.model {
            ClassifierModel::Forest { trees } => {
                let total: f64 = trees.iter().map(|tree| tree.leaf_probability(&x)).sum();
                total / trees.len() as f64
            }
            ClassifierModel::Logistic {
                intercept,
                coefficients,
            } => {
                let eta = intercept + aview1(coefficients).dot(&x);
                // Clamp eta to keep exp() finite.
                1.0 / (1.0 + f64::exp(-eta.clamp(-700.0, 700.0)))
            }
        }
    }

    pub fn kind_name(&self) -> String {
        match &self.model {
            ClassifierModel::Forest { trees } => {
                format!("decision forest of {} trees", trees.len())
            }
            ClassifierModel::Logistic { .. } => "logistic regression".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelUnavailableError> {
        ModelUnavailableError::check_schema(ARTIFACT, &self.schema)?;
        match &self.model {
            ClassifierModel::Forest { trees } => {
                if trees.is_empty() {
                    return Err(ModelUnavailableError::invalid(
                        ARTIFACT,
                        "forest contains no trees",
                    ));
                }
                for (tree_index, tree) in trees.iter().enumerate() {
                    tree.validate(tree_index)?;
                }
            }
            ClassifierModel::Logistic {
                intercept,
                coefficients,
            } => {
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelUnavailableError::invalid(
                        ARTIFACT,
                        "logistic parameters must be finite",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Saves the classifier to a file in a human-readable TOML format.
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

    /// Loads a classifier from a TOML file and validates its structure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelUnavailableError> {
        let path = path.as_ref();
        log::info!("Loading classifier artifact from {}", path.display());
        let toml_string = fs::read_to_string(path).map_err(|source| ModelUnavailableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let classifier: Self =
            toml::from_str(&toml_string).map_err(|source| ModelUnavailableError::TomlParse {
                path: path.to_path_buf(),
                source,
            })?;
        classifier.validate()?;
        Ok(classifier)
    }
}
