// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Biological sex as recorded on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
}

impl Gender {
    /// The indicator used in the feature vector: 1 for male, 0 otherwise.
    #[inline]
    pub fn code(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
        }
    }
}

/// The four biomarkers that drive both the heuristic and the contribution chart.
/// Variant order is the display order of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Biomarker {
    Age,
    #[serde(rename = "BMI")]
    Bmi,
    Glucose,
    #[serde(rename = "HbA1c")]
    Hba1c,
}

impl Biomarker {
    pub const ALL: [Biomarker; 4] = [
        Biomarker::Age,
        Biomarker::Bmi,
        Biomarker::Glucose,
        Biomarker::Hba1c,
    ];

    /// Upper end of the reference range used to express a reading as a percentage.
    pub fn reference_maximum(self) -> f64 {
        match self {
            Biomarker::Age => 120.0,
            Biomarker::Bmi => 50.0,
            Biomarker::Glucose => 400.0,
            Biomarker::Hba1c => 15.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Biomarker::Age => "Age",
            Biomarker::Bmi => "BMI",
            Biomarker::Glucose => "Glucose",
            Biomarker::Hba1c => "HbA1c",
        }
    }
}

impl fmt::Display for Biomarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The verdict of the pre-trained classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum DiabetesLabel {
    Negative,
    Positive,
}

impl DiabetesLabel {
    /// Maps a positive-class probability onto a label. Exactly 0.5 resolves to
    /// `Negative`, the same way an argmax over `[1 - p, p]` picks the first class.
    #[inline]
    pub fn from_probability(p: f64) -> Self {
        if p > 0.5 {
            DiabetesLabel::Positive
        } else {
            DiabetesLabel::Negative
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            DiabetesLabel::Negative => 0,
            DiabetesLabel::Positive => 1,
        }
    }

    pub fn is_positive(self) -> bool {
        self == DiabetesLabel::Positive
    }
}

impl From<DiabetesLabel> for u8 {
    fn from(label: DiabetesLabel) -> Self {
        label.as_u8()
    }
}

/// The heuristic risk index. `value` is clamped to [0, 1]; `raw` is the
/// un-normalized sum of triggered rule weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    pub value: f64,
    pub raw: f64,
}

impl RiskScore {
    /// The index as a percentage, e.g. for a "Threat Index: 62.5%" caption.
    #[inline]
    pub fn percent(&self) -> f64 {
        self.value * 100.0
    }
}

/// Each biomarker reading expressed as a percentage of its reference maximum.
pub type BiomarkerBreakdown = BTreeMap<Biomarker, f64>;

/// Everything the presentation layer needs to render one scan.
/// Created once per request and dropped once rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub classifier_label: DiabetesLabel,
    pub risk_score: RiskScore,
    pub biomarker_breakdown: BiomarkerBreakdown,
}
