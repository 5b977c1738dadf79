//! Report configuration, loadable from TOML and overridable from the CLI.

use al_core::TimeInterval;
use al_core::gate::DEFAULT_MAX_LINE_LENGTH;
use serde::Deserialize;

use crate::cli::Cli;

/// How the finished report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How diagnostic logs are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Pretty,
    Json,
}

/// Top-level configuration for a report run.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Lines longer than this many characters are skipped.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Intervals that rates are reported in.
    #[serde(default = "default_intervals")]
    pub intervals: Vec<TimeInterval>,
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default)]
    pub log_format: LogOutput,
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

fn default_intervals() -> Vec<TimeInterval> {
    vec![TimeInterval::Minute, TimeInterval::Hour, TimeInterval::Day]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            intervals: default_intervals(),
            output: OutputFormat::default(),
            log_format: LogOutput::default(),
        }
    }
}

impl ReportConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Config file (or defaults) with command-line flags applied on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match cli.config {
            Some(ref path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(max) = cli.max_line_length {
            config.max_line_length = max;
        }
        if !cli.intervals.is_empty() {
            config.intervals = cli.intervals.clone();
        }
        if cli.json {
            config.output = OutputFormat::Json;
        }
        if cli.log_json {
            config.log_format = LogOutput::Json;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_line_length == 0 {
            anyhow::bail!("max_line_length must be greater than zero");
        }
        if self.intervals.is_empty() {
            anyhow::bail!("at least one rate interval is required");
        }
        Ok(())
    }
}
