//! Ingest pipeline: raw lines → gate → tokenizer → statistics.
//!
//! Per-line failures never abort the run. Each one is logged and recorded in
//! the returned [`IngestSummary`] so format drift can be audited.

use serde::Serialize;

use crate::error::LogError;
use crate::gate::LineGate;
use crate::parsers;
use crate::stats::Statistics;

/// Why a line contributed nothing to the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    TooLong,
    Malformed,
    Rejected,
}

/// A line that was skipped, with its 1-based number and the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub kind: SkipKind,
    pub reason: String,
}

/// Outcome of feeding a batch of lines through the pipeline.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    /// Lines read from the source, blank ones included.
    pub total_lines: usize,
    /// Lines that became entries.
    pub parsed: usize,
    pub too_long: usize,
    pub malformed: usize,
    /// Lines the gate declined without an error.
    pub filtered: usize,
    pub blank: usize,
    /// Shortest and longest line that passed the gate, in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_line_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_line_length: Option<usize>,
    pub skipped: Vec<SkippedLine>,
}

impl IngestSummary {
    fn skip(&mut self, line_number: usize, kind: SkipKind, error: &LogError) {
        match kind {
            SkipKind::TooLong => self.too_long += 1,
            SkipKind::Malformed => self.malformed += 1,
            SkipKind::Rejected => {}
        }
        tracing::warn!(line = line_number, kind = ?kind, error = %error, "skipping line");
        self.skipped.push(SkippedLine {
            line_number,
            kind,
            reason: error.to_string(),
        });
    }

    fn observe_length(&mut self, length: usize) {
        self.min_line_length = Some(self.min_line_length.map_or(length, |m| m.min(length)));
        self.max_line_length = Some(self.max_line_length.map_or(length, |m| m.max(length)));
    }
}

/// Feed `lines` through `gate` and the tokenizer into `stats`.
pub fn ingest<G>(lines: &[String], gate: &G, stats: &mut Statistics) -> IngestSummary
where
    G: LineGate + ?Sized,
{
    let mut summary = IngestSummary {
        total_lines: lines.len(),
        ..Default::default()
    };

    for (i, line) in lines.iter().enumerate() {
        let line_number = i + 1;

        match gate.accept(line) {
            Ok(true) => {}
            Ok(false) => {
                summary.filtered += 1;
                continue;
            }
            Err(e @ LogError::LineTooLong { .. }) => {
                summary.skip(line_number, SkipKind::TooLong, &e);
                continue;
            }
            Err(e) => {
                summary.skip(line_number, SkipKind::Rejected, &e);
                continue;
            }
        }

        summary.observe_length(line.chars().count());

        if line.trim().is_empty() {
            summary.blank += 1;
            continue;
        }

        match parsers::parse_line(line, line_number) {
            Ok(entry) => {
                stats.add_entry(entry);
                summary.parsed += 1;
            }
            Err(e) => summary.skip(line_number, SkipKind::Malformed, &e),
        }
    }

    tracing::debug!(
        total = summary.total_lines,
        parsed = summary.parsed,
        too_long = summary.too_long,
        malformed = summary.malformed,
        "ingest finished"
    );
    summary
}
