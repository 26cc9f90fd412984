// ========================================================================================
//
//                      THE PREDICTION ORCHESTRATOR
//
// ========================================================================================
//
// One scan request flows through a fixed sequence of states:
//
//     Idle -> Assembling -> Scoring -> Classifying -> Complete
//                  |                        |
//                  v                        v
//               Blocked                  Failed
//
// The heuristic is pure and always runs once features exist. The classifier runs last
// and is never reached when BMI is unresolved. State lives in a per-request value and
// is dropped with it; the orchestrator itself only borrows the shared classifier.

use crate::classify::{Classifier, ModelUnavailableError};
use crate::features::{ClinicalInputs, FeatureVector, IncompleteInputError, assemble};
use crate::heuristic;
use crate::types::{Biomarker, BiomarkerBreakdown, PredictionOutcome};
use std::fmt;
use thiserror::Error;

/// Where a single scan request currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    Idle,
    Assembling,
    Scoring,
    Classifying,
    /// Terminal: both results are bound into an outcome.
    Complete,
    /// Terminal: BMI was unresolved. The scan control stays disabled upstream.
    Blocked,
    /// Terminal and fatal: the classifier artifacts are unavailable.
    Failed,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanState::Complete | ScanState::Blocked | ScanState::Failed
        )
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanState::Idle => "idle",
            ScanState::Assembling => "assembling",
            ScanState::Scoring => "scoring",
            ScanState::Classifying => "classifying",
            ScanState::Complete => "complete",
            ScanState::Blocked => "blocked",
            ScanState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The two ways a scan can end without an outcome.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan blocked: {0}")]
    Blocked(#[from] IncompleteInputError),
    #[error("Classifier unavailable: {0}")]
    Failed(#[from] ModelUnavailableError),
}

impl ScanError {
    pub fn terminal_state(&self) -> ScanState {
        match self {
            ScanError::Blocked(_) => ScanState::Blocked,
            ScanError::Failed(_) => ScanState::Failed,
        }
    }
}

/// The full record of one request: every state visited, and how it ended.
#[derive(Debug)]
pub struct ScanReport {
    pub states: Vec<ScanState>,
    pub result: Result<PredictionOutcome, ScanError>,
}

impl ScanReport {
    pub fn final_state(&self) -> ScanState {
        self.states.last().copied().unwrap_or(ScanState::Idle)
    }
}

/// Per-request state. Created for one scan and dropped with its report.
struct ScanRun {
    states: Vec<ScanState>,
}

impl ScanRun {
    fn new() -> Self {
        Self {
            states: vec![ScanState::Idle],
        }
    }

    fn advance(&mut self, next: ScanState) {
        if let Some(&current) = self.states.last() {
            debug_assert!(!current.is_terminal(), "no transition out of {current}");
            log::debug!("Scan transition: {current} -> {next}");
        }
        self.states.push(next);
    }

    fn finish(mut self, result: Result<PredictionOutcome, ScanError>) -> ScanReport {
        let terminal = match &result {
            Ok(_) => ScanState::Complete,
            Err(e) => e.terminal_state(),
        };
        self.advance(terminal);
        ScanReport {
            states: self.states,
            result,
        }
    }
}

/// Sequences assembly, scoring and classification for one request at a time.
pub struct PredictionOrchestrator<'a, C: Classifier + ?Sized> {
    classifier: &'a C,
}

impl<'a, C: Classifier + ?Sized> PredictionOrchestrator<'a, C> {
    pub fn new(classifier: &'a C) -> Self {
        Self { classifier }
    }

    /// Runs one scan and returns its outcome or the terminal error.
    pub fn run_scan(&self, inputs: &ClinicalInputs) -> Result<PredictionOutcome, ScanError> {
        self.run_scan_with_trace(inputs).result
    }

    /// Runs one scan and keeps the visited states alongside the result.
    pub fn run_scan_with_trace(&self, inputs: &ClinicalInputs) -> ScanReport {
        let mut run = ScanRun::new();

        run.advance(ScanState::Assembling);
        let features = match assemble(inputs) {
            Ok(features) => features,
            Err(e) => {
                log::warn!("Scan blocked before classification: {e}");
                return run.finish(Err(e.into()));
            }
        };

        run.advance(ScanState::Scoring);
        let risk_score =
            heuristic::score(features.age, features.glucose, features.hba1c, features.bmi);
        log::debug!(
            "Heuristic risk {:.3} (raw weight sum {:.1})",
            risk_score.value,
            risk_score.raw
        );

        run.advance(ScanState::Classifying);
        let classifier_label = match self.classifier.predict(&features) {
            Ok(label) => label,
            Err(e) => {
                log::error!("Classifier failed: {e}");
                return run.finish(Err(e.into()));
            }
        };

        let outcome = PredictionOutcome {
            classifier_label,
            risk_score,
            biomarker_breakdown: biomarker_breakdown(&features),
        };
        run.finish(Ok(outcome))
    }
}

/// Convenience wrapper for a single request against a shared classifier.
pub fn run_scan<C: Classifier + ?Sized>(
    classifier: &C,
    inputs: &ClinicalInputs,
) -> Result<PredictionOutcome, ScanError> {
    PredictionOrchestrator::new(classifier).run_scan(inputs)
}

/// Each chart biomarker as a percentage of its reference maximum.
pub fn biomarker_breakdown(features: &FeatureVector) -> BiomarkerBreakdown {
    Biomarker::ALL
        .into_iter()
        .map(|biomarker| {
            let reading = match biomarker {
                Biomarker::Age => features.age,
                Biomarker::Bmi => features.bmi,
                Biomarker::Glucose => features.glucose,
                Biomarker::Hba1c => features.hba1c,
            };
            (biomarker, reading / biomarker.reference_maximum() * 100.0)
        })
        .collect()
}
