//! # Heuristic Risk Index
//!
//! A hand-authored, additive threshold rule over four biomarkers. It is independent
//! of the classifier and exists to give the reader a graded percentage next to the
//! binary verdict. It is not a calibrated probability.
//!
//! Each biomarker carries two tiers. When a reading clears both, both weights are
//! added, so severity grows in steps rather than jumping at a single cutoff. The sum
//! is divided by [`NORMALIZER`] and clamped to 1.0.

use crate::types::{Biomarker, RiskScore};

/// Divisor applied to the raw sum of triggered weights.
pub const NORMALIZER: f64 = 12.0;

/// A single "reading above threshold adds weight" rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    pub biomarker: Biomarker,
    /// Strict lower bound: the rule fires when the reading is greater than this.
    pub threshold: f64,
    pub weight: f64,
}

/// The complete rule table. Tiers for one biomarker stack.
pub const RULES: [ThresholdRule; 8] = [
    ThresholdRule {
        biomarker: Biomarker::Age,
        threshold: 45.0,
        weight: 1.5,
    },
    ThresholdRule {
        biomarker: Biomarker::Age,
        threshold: 60.0,
        weight: 2.0,
    },
    ThresholdRule {
        biomarker: Biomarker::Glucose,
        threshold: 140.0,
        weight: 2.5,
    },
    ThresholdRule {
        biomarker: Biomarker::Glucose,
        threshold: 200.0,
        weight: 3.0,
    },
    ThresholdRule {
        biomarker: Biomarker::Hba1c,
        threshold: 5.7,
        weight: 2.0,
    },
    ThresholdRule {
        biomarker: Biomarker::Hba1c,
        threshold: 6.5,
        weight: 3.0,
    },
    ThresholdRule {
        biomarker: Biomarker::Bmi,
        threshold: 27.0,
        weight: 1.5,
    },
    ThresholdRule {
        biomarker: Biomarker::Bmi,
        threshold: 30.0,
        weight: 2.5,
    },
];

/// Scores one set of readings against [`RULES`].
pub fn score(age: f64, glucose: f64, hba1c: f64, bmi: f64) -> RiskScore {
    let reading = |biomarker: Biomarker| match biomarker {
        Biomarker::Age => age,
        Biomarker::Glucose => glucose,
        Biomarker::Hba1c => hba1c,
        Biomarker::Bmi => bmi,
    };

    let raw: f64 = RULES
        .iter()
        .filter(|rule| reading(rule.biomarker) > rule.threshold)
        .map(|rule| rule.weight)
        .sum();

    RiskScore {
        value: (raw / NORMALIZER).min(1.0),
        raw,
    }
}
