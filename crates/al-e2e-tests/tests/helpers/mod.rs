//! Shared test harness for E2E tests.
//!
//! Serves log lines from a `MockLogSource` and drives the same `run`
//! entry point the binary uses.

#![allow(dead_code)]

use al_core::{LogResult, MaxLengthGate, MockLogSource, Statistics, ingest};
use al_report::config::ReportConfig;
use al_report::report::Report;

pub const LOG_PATH: &str = "/var/log/nginx/access.log";

/// Scenario A line: Chrome on Windows, status 200, referer set.
pub const LINE_A: &str = r#"127.0.0.1 - - [10/Oct/2020:13:55:36 -0700] "GET /index.html HTTP/1.1" 200 2326 "http://example.com/" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/86.0""#;

/// Build a combined-format line from its variable parts.
pub fn line(ip: &str, time: &str, request: &str, status: u16, size: u64, referer: &str, agent: &str) -> String {
    format!(r#"{ip} - - [{time}] "{request}" {status} {size} "{referer}" "{agent}""#)
}

pub struct TestHarness {
    pub source: MockLogSource,
    pub config: ReportConfig,
}

impl TestHarness {
    pub fn with_lines(lines: Vec<String>) -> Self {
        let mut source = MockLogSource::new();
        source.add_file(LOG_PATH, lines);
        Self {
            source,
            config: ReportConfig::default(),
        }
    }

    pub fn with_sample() -> Self {
        Self::with_lines(al_core::mock::access_sample())
    }

    /// Run the full report pipeline against the mock file.
    pub async fn report(&self) -> LogResult<Report> {
        al_report::run(&self.source, LOG_PATH, &self.config).await
    }

    /// Ingest the mock file straight into a `Statistics`.
    pub async fn stats(&self) -> Statistics {
        use al_core::LogSource;
        let lines = self
            .source
            .read_lines(LOG_PATH)
            .await
            .expect("mock file should exist");
        let mut stats = Statistics::new();
        ingest(&lines, &MaxLengthGate::new(self.config.max_line_length), &mut stats);
        stats
    }
}
