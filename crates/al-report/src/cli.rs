//! Command-line arguments.

use std::path::PathBuf;

use al_core::TimeInterval;
use clap::Parser;

/// Summarize a combined-format access log.
#[derive(Debug, Parser)]
#[command(name = "al-report", version, about)]
pub struct Cli {
    /// Access log to analyze. Prompts on stdin when omitted.
    pub path: Option<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip lines longer than this many characters.
    #[arg(long)]
    pub max_line_length: Option<usize>,

    /// Rate interval (second, minute, hour, day). Repeatable.
    #[arg(short, long = "interval")]
    pub intervals: Vec<TimeInterval>,

    /// Write the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Write diagnostic logs to stderr as JSON.
    #[arg(long)]
    pub log_json: bool,
}
