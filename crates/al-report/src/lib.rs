//! Access log report driver — library crate.
//!
//! Exposes the CLI, configuration, prompt and report modules so the binary
//! stays thin and external crates (e.g. `al-e2e-tests`) can drive a run
//! without spawning a process.

pub mod cli;
pub mod config;
pub mod prompt;
pub mod report;

use al_core::{LogResult, LogSource, MaxLengthGate, Statistics, ingest};

use crate::config::ReportConfig;
use crate::report::Report;

/// Read `path` from `source`, ingest every line and build the report.
///
/// Per-line problems end up in the report; only source failures are errors.
pub async fn run(source: &dyn LogSource, path: &str, config: &ReportConfig) -> LogResult<Report> {
    let lines = source.read_lines(path).await?;
    tracing::info!(path, lines = lines.len(), "log read");

    let gate = MaxLengthGate::new(config.max_line_length);
    let mut stats = Statistics::new();
    let summary = ingest(&lines, &gate, &mut stats);
    tracing::info!(
        parsed = summary.parsed,
        too_long = summary.too_long,
        malformed = summary.malformed,
        "ingest complete"
    );

    Ok(Report::build(path, &stats, summary, &config.intervals))
}
