use super::OutcomeRenderer;
use crate::types::PredictionOutcome;
use std::io::{self, Write};

/// Plain-text rendering for a terminal.
#[derive(Debug, Clone)]
pub struct ConsoleRenderer {
    /// Width, in cells, of the progress bar and of a 100% chart bar.
    pub bar_width: usize,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self { bar_width: 40 }
    }
}

impl ConsoleRenderer {
    fn bar(&self, percent: f64) -> String {
        let fraction = percent.clamp(0.0, 100.0) / 100.0;
        let filled = (fraction * self.bar_width as f64).round() as usize;
        let mut bar = "█".repeat(filled);
        bar.push_str(&"·".repeat(self.bar_width - filled));
        bar
    }
}

impl OutcomeRenderer for ConsoleRenderer {
    fn render(&self, outcome: &PredictionOutcome, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Biomarker Contribution")?;
        for (biomarker, percent) in &outcome.biomarker_breakdown {
            writeln!(out, "  {:<8} {} {percent:>5.1}%", biomarker.label(), self.bar(*percent))?;
        }
        writeln!(out)?;

        let threat = outcome.risk_score.percent();
        writeln!(out, "[{}]", self.bar(threat))?;
        writeln!(out, "Threat Index: {threat:.1}%")?;
        writeln!(out)?;

        if outcome.classifier_label.is_positive() {
            writeln!(out, "HIGH RISK DETECTED")?;
        } else {
            writeln!(out, "Risk nominal")?;
        }
        Ok(())
    }
}
