use super::OutcomeRenderer;
use crate::types::PredictionOutcome;
use std::io::{self, Write};

/// Machine-readable rendering: the outcome as a single pretty-printed JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl OutcomeRenderer for JsonRenderer {
    fn render(&self, outcome: &PredictionOutcome, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, outcome)?;
        writeln!(out)
    }
}
