//! # Feature Assembly
//!
//! Turns the raw intake values into the seven-column feature vector consumed by
//! the scaler and classifier artifacts.
//!
//! - Strict Schema: the column order is fixed by [`FeatureSchema::canonical`] and is
//!   carried, by name and version, inside every artifact. Positional arrays are only
//!   ever produced by [`FeatureVector::to_array`], which walks that schema.
//! - BMI Resolution: a directly measured BMI wins; otherwise BMI is derived from
//!   weight and height. Without either, assembly fails and nothing downstream runs.

use crate::types::Gender;
use ndarray::Array1;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Number of columns in the feature vector.
pub const FEATURE_COUNT: usize = 7;

/// Version of the column layout below. Bump whenever the column layout changes and refit
/// the artifacts.
pub const SCHEMA_VERSION: u32 = 1;

type Column = (&'static str, fn(&FeatureVector) -> f64);

/// Canonical column order shared with the fitted scaler and classifier. Each name is
/// bound to the field it reads, so order and meaning cannot drift apart.
const COLUMNS: [Column; FEATURE_COUNT] = [
    ("gender", |f| f.gender_code),
    ("age", |f| f.age),
    ("hypertension", |f| f.hypertension),
    ("heart_disease", |f| f.heart_disease),
    ("bmi", |f| f.bmi),
    ("hba1c", |f| f.hba1c),
    ("glucose", |f| f.glucose),
];

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = {
    let mut names = [""; FEATURE_COUNT];
    let mut i = 0;
    while i < FEATURE_COUNT {
        names[i] = COLUMNS[i].0;
        i += 1;
    }
    names
};

/// Inclusive intake bounds, as enforced by the input form.
pub const AGE_RANGE: (u32, u32) = (10, 120);
pub const HBA1C_RANGE: (f64, f64) = (3.0, 15.0);
pub const GLUCOSE_RANGE: (f64, f64) = (70.0, 400.0);
pub const WEIGHT_KG_RANGE: (f64, f64) = (1.0, 300.0);
pub const HEIGHT_CM_RANGE: (f64, f64) = (30.0, 250.0);

/// A named, versioned column layout. Artifacts store one of these and are refused at
/// load time when it differs from [`FeatureSchema::canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub features: Vec<String>,
}

impl FeatureSchema {
    pub fn canonical() -> Self {
        Self {
            version: SCHEMA_VERSION,
            features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.version == SCHEMA_VERSION
            && self.features.len() == FEATURE_COUNT
            && self
                .features
                .iter()
                .zip(FEATURE_NAMES.iter())
                .all(|(found, expected)| found == expected)
    }
}

/// Raised when BMI cannot be resolved. The scan must not proceed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IncompleteInputError {
    #[error(
        "BMI is unresolved: provide `bmi` directly or both `weight_kg` and `height_cm` (missing: {})",
        .missing.join(", ")
    )]
    BmiUnresolved { missing: Vec<&'static str> },
    #[error(
        "BMI could not be derived from weight {weight_kg} kg and height {height_cm} cm; the result is not a finite number."
    )]
    NonFiniteBmi { weight_kg: f64, height_cm: f64 },
}

/// Every intake value that falls outside the form's bounds, reported together.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Clinical inputs out of range: {}", .violations.join("; "))]
pub struct InputRangeError {
    pub violations: Vec<String>,
}

/// One patient's intake values for a single scan request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInputs {
    pub gender: Gender,
    /// Age in whole years.
    pub age: u32,
    #[serde(deserialize_with = "deserialize_indicator")]
    pub hypertension: bool,
    #[serde(deserialize_with = "deserialize_indicator")]
    pub heart_disease: bool,
    /// Glycated hemoglobin, percent.
    pub hba1c: f64,
    /// Blood glucose, mg/dL.
    pub glucose: f64,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
}

impl ClinicalInputs {
    /// Whether the scan action may be offered. Mirrors what [`assemble`] will accept.
    pub fn is_scan_ready(&self) -> bool {
        self.resolve_bmi().is_ok()
    }

    /// Resolves BMI from the direct reading, or from weight and height.
    pub fn resolve_bmi(&self) -> Result<f64, IncompleteInputError> {
        if let Some(bmi) = self.bmi {
            return Ok(bmi);
        }
        match (self.weight_kg, self.height_cm) {
            (Some(weight_kg), Some(height_cm)) => {
                let bmi = compute_bmi(weight_kg, height_cm);
                if bmi.is_finite() {
                    Ok(bmi)
                } else {
                    Err(IncompleteInputError::NonFiniteBmi {
                        weight_kg,
                        height_cm,
                    })
                }
            }
            (weight_kg, height_cm) => {
                let mut missing = vec!["bmi"];
                if weight_kg.is_none() {
                    missing.push("weight_kg");
                }
                if height_cm.is_none() {
                    missing.push("height_cm");
                }
                Err(IncompleteInputError::BmiUnresolved { missing })
            }
        }
    }

    /// Checks every value against the intake bounds. Intended for callers that accept
    /// free-form input; the pipeline itself assumes bounded values.
    pub fn validate(&self) -> Result<(), InputRangeError> {
        let mut violations = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            violations.push(format!(
                "age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        check_range(&mut violations, "hba1c", self.hba1c, HBA1C_RANGE);
        check_range(&mut violations, "glucose", self.glucose, GLUCOSE_RANGE);
        if let Some(weight_kg) = self.weight_kg {
            check_range(&mut violations, "weight_kg", weight_kg, WEIGHT_KG_RANGE);
        }
        if let Some(height_cm) = self.height_cm {
            check_range(&mut violations, "height_cm", height_cm, HEIGHT_CM_RANGE);
        }
        if let Some(bmi) = self.bmi {
            if !bmi.is_finite() || bmi <= 0.0 {
                violations.push(format!("bmi {bmi} must be a positive number"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(InputRangeError { violations })
        }
    }
}

/// Checks a weight/height pair against the intake bounds before BMI is derived from it.
pub fn check_measurements(weight_kg: f64, height_cm: f64) -> Result<(), InputRangeError> {
    let mut violations = Vec::new();
    check_range(&mut violations, "weight_kg", weight_kg, WEIGHT_KG_RANGE);
    check_range(&mut violations, "height_cm", height_cm, HEIGHT_CM_RANGE);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(InputRangeError { violations })
    }
}

/// Accepts an indicator written either as a boolean or as the 0/1 code.
fn deserialize_indicator<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Indicator {
        Flag(bool),
        Code(i64),
    }

    match Indicator::deserialize(deserializer)? {
        Indicator::Flag(flag) => Ok(flag),
        Indicator::Code(0) => Ok(false),
        Indicator::Code(1) => Ok(true),
        Indicator::Code(other) => Err(D::Error::custom(format!(
            "indicator must be 0 or 1, got {other}"
        ))),
    }
}

fn check_range(violations: &mut Vec<String>, name: &str, value: f64, (lo, hi): (f64, f64)) {
    // NaN fails `contains`, so it is reported here as well.
    if !(lo..=hi).contains(&value) {
        violations.push(format!("{name} {value} out of range [{lo}, {hi}]"));
    }
}

/// BMI from weight (kg) and height (cm), rounded to two decimals.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 100.0).round() / 100.0
}

/// The assembled model input. Fields are named so that no caller builds the positional
/// layout by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub gender_code: f64,
    pub age: f64,
    pub hypertension: f64,
    pub heart_disease: f64,
    pub bmi: f64,
    pub hba1c: f64,
    pub glucose: f64,
}

impl FeatureVector {
    /// The vector in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        COLUMNS.map(|(_, read)| read(self))
    }

    pub fn to_array1(&self) -> Array1<f64> {
        Array1::from(self.to_array().to_vec())
    }
}

/// Builds the feature vector for one scan. Pure; fails only when BMI is unresolved.
pub fn assemble(inputs: &ClinicalInputs) -> Result<FeatureVector, IncompleteInputError> {
    let bmi = inputs.resolve_bmi()?;
    Ok(FeatureVector {
        gender_code: inputs.gender.code(),
        age: f64::from(inputs.age),
        hypertension: indicator(inputs.hypertension),
        heart_disease: indicator(inputs.heart_disease),
        bmi,
        hba1c: inputs.hba1c,
        glucose: inputs.glucose,
    })
}

#[inline]
fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_inputs() -> ClinicalInputs {
        ClinicalInputs {
            gender: Gender::Female,
            age: 42,
            hypertension: false,
            heart_disease: true,
            hba1c: 5.9,
            glucose: 118.0,
            bmi: None,
            weight_kg: Some(70.0),
            height_cm: Some(170.0),
        }
    }

    #[test]
    fn bmi_is_derived_and_rounded_to_two_decimals() {
        assert_eq!(compute_bmi(70.0, 170.0), 24.22);
        assert_eq!(base_inputs().resolve_bmi(), Ok(24.22));
    }

    #[test]
    fn direct_bmi_takes_precedence_over_measurements() {
        let inputs = ClinicalInputs {
            bmi: Some(31.5),
            ..base_inputs()
        };
        assert_eq!(inputs.resolve_bmi(), Ok(31.5));
    }

    #[test]
    fn missing_height_blocks_assembly() {
        let inputs = ClinicalInputs {
            height_cm: None,
            ..base_inputs()
        };
        assert!(!inputs.is_scan_ready());
        match assemble(&inputs) {
            Err(IncompleteInputError::BmiUnresolved { missing }) => {
                assert_eq!(missing, vec!["bmi", "height_cm"]);
            }
            other => panic!("expected BmiUnresolved, got {other:?}"),
        }
    }

    #[test]
    fn zero_height_is_reported_as_non_finite() {
        let inputs = ClinicalInputs {
            height_cm: Some(0.0),
            ..base_inputs()
        };
        assert!(matches!(
            inputs.resolve_bmi(),
            Err(IncompleteInputError::NonFiniteBmi { .. })
        ));
    }

    #[test]
    fn assembled_vector_follows_canonical_order() {
        let inputs = ClinicalInputs {
            gender: Gender::Male,
            age: 65,
            hypertension: true,
            heart_disease: false,
            hba1c: 7.2,
            glucose: 210.0,
            bmi: Some(31.0),
            weight_kg: None,
            height_cm: None,
        };
        let features = assemble(&inputs).unwrap();
        assert_eq!(
            features.to_array(),
            [1.0, 65.0, 1.0, 0.0, 31.0, 7.2, 210.0]
        );
        assert_eq!(features.to_array1().len(), FEATURE_COUNT);
    }

    #[test]
    fn assembly_is_deterministic() {
        let inputs = base_inputs();
        let first = assemble(&inputs).unwrap().to_array();
        for _ in 0..16 {
            let again = assemble(&inputs).unwrap().to_array();
            let same_bits = first
                .iter()
                .zip(again.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits());
            assert!(same_bits);
        }
    }

    #[test]
    fn canonical_schema_matches_feature_names() {
        let schema = FeatureSchema::canonical();
        assert!(schema.is_canonical());

        let mut swapped = schema.clone();
        swapped.features.swap(5, 6);
        assert!(!swapped.is_canonical());

        let bumped = FeatureSchema {
            version: SCHEMA_VERSION + 1,
            ..schema
        };
        assert!(!bumped.is_canonical());
    }

    #[test]
    fn validate_collects_every_violation() {
        let inputs = ClinicalInputs {
            age: 5,
            glucose: 12.0,
            weight_kg: Some(400.0),
            ..base_inputs()
        };
        let err = inputs.validate().unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert!(err.to_string().contains("age 5"));
        assert!(base_inputs().validate().is_ok());
    }

    #[test]
    fn measurements_outside_intake_bounds_are_refused() {
        assert!(check_measurements(70.0, 170.0).is_ok());
        let err = check_measurements(70.0, 0.0).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.violations[0].starts_with("height_cm"));
        assert_eq!(check_measurements(f64::NAN, 500.0).unwrap_err().violations.len(), 2);
    }

    #[test]
    fn intake_file_accepts_coded_indicators_and_capitalized_gender() {
        let inputs: ClinicalInputs = toml::from_str(
            r#"
            gender = "Male"
            age = 65
            hypertension = 1
            heart_disease = 0
            hba1c = 7.2
            glucose = 210.0
            bmi = 31.0
            "#,
        )
        .unwrap();
        assert_eq!(inputs.gender, Gender::Male);
        assert!(inputs.hypertension);
        assert!(!inputs.heart_disease);
    }

    #[test]
    fn intake_file_still_accepts_booleans_and_lowercase_gender() {
        let inputs: ClinicalInputs = toml::from_str(
            r#"
            gender = "female"
            age = 42
            hypertension = false
            heart_disease = true
            hba1c = 5.9
            glucose = 118.0
            weight_kg = 70.0
            height_cm = 170.0
            "#,
        )
        .unwrap();
        assert_eq!(inputs, base_inputs());
    }

    #[test]
    fn intake_file_rejects_indicator_codes_other_than_zero_or_one() {
        let result: Result<ClinicalInputs, _> = toml::from_str(
            r#"
            gender = "male"
            age = 65
            hypertension = 2
            heart_disease = 0
            hba1c = 7.2
            glucose = 210.0
            bmi = 31.0
            "#,
        );
        assert!(result.is_err());
    }
}
