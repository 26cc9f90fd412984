//! # Outcome Renderers
//!
//! The pipeline only produces data. Each renderer turns a [`PredictionOutcome`] into
//! one presentation: the classifier label becomes an alert or success banner, the
//! heuristic index a progress bar with a "Threat Index" caption, and the biomarker
//! breakdown a bar chart. Renderers are interchangeable and share no state.

use crate::types::PredictionOutcome;
use std::io::{self, Write};
use std::str::FromStr;

pub mod console;
pub mod json;

pub use console::ConsoleRenderer;
pub use json::JsonRenderer;

/// A presentation adapter for scan outcomes.
pub trait OutcomeRenderer {
    fn render(&self, outcome: &PredictionOutcome, out: &mut dyn Write) -> io::Result<()>;
}

/// The built-in renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Json,
}

impl RenderFormat {
    pub fn renderer(self) -> Box<dyn OutcomeRenderer> {
        match self {
            RenderFormat::Text => Box::new(ConsoleRenderer::default()),
            RenderFormat::Json => Box::new(JsonRenderer),
        }
    }
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(RenderFormat::Text),
            "json" => Ok(RenderFormat::Json),
            other => Err(format!(
                "unknown render format '{other}' (expected 'text' or 'json')"
            )),
        }
    }
}
