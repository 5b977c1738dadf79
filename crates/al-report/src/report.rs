//! Report snapshot built from accumulated statistics, rendered as text or JSON.

use std::collections::BTreeMap;
use std::fmt;

use al_core::stats::CrawlerShare;
use al_core::{BrowserFamily, IngestSummary, LogResult, OsFamily, Statistics, TimeInterval};
use chrono::{DateTime, Utc};
use serde::Serialize;

const RULE: &str = "==================================================================";

/// Earliest and latest request, with the span between them.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSpan {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    pub seconds: i64,
}

/// A rate in one interval; `None` when the time span is empty.
#[derive(Debug, Clone, Serialize)]
pub struct Rate {
    pub interval: TimeInterval,
    pub value: Option<f64>,
}

/// Everything a report prints, computed once.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub ingest: IngestSummary,
    pub entries: usize,
    pub total_bytes: u64,
    pub time_span: Option<TimeSpan>,
    pub traffic_rates: Vec<Rate>,
    pub user_request_rates: Vec<Rate>,
    pub error_request_rates: Vec<Rate>,
    pub user_attendance_rate: Option<f64>,
    pub existing_pages: Vec<String>,
    pub non_existing_pages: Vec<String>,
    pub os_rates: BTreeMap<OsFamily, f64>,
    pub browser_rates: BTreeMap<BrowserFamily, f64>,
    pub peak_times: BTreeMap<DateTime<Utc>, usize>,
    pub peak_clients: BTreeMap<String, usize>,
    pub domains: Vec<String>,
    pub crawlers: BTreeMap<String, CrawlerShare>,
}

impl Report {
    pub fn build(
        source: impl Into<String>,
        stats: &Statistics,
        ingest: IngestSummary,
        intervals: &[TimeInterval],
    ) -> Self {
        let rates = |f: &dyn Fn(TimeInterval) -> LogResult<f64>| -> Vec<Rate> {
            intervals
                .iter()
                .map(|&interval| Rate {
                    interval,
                    value: available(f(interval)),
                })
                .collect()
        };

        let time_span = stats.time_span().map(|(earliest, latest)| TimeSpan {
            earliest,
            latest,
            seconds: (latest - earliest).num_seconds(),
        });

        Self {
            source: source.into(),
            ingest,
            entries: stats.len(),
            total_bytes: stats.total_bytes(),
            time_span,
            traffic_rates: rates(&|i: TimeInterval| stats.traffic_rate(i)),
            user_request_rates: rates(&|i: TimeInterval| stats.user_request_rate(i)),
            error_request_rates: rates(&|i: TimeInterval| stats.error_request_rate(i)),
            user_attendance_rate: available(stats.user_attendance_rate()),
            existing_pages: stats.existing_pages().into_iter().collect(),
            non_existing_pages: stats.non_existing_pages().into_iter().collect(),
            os_rates: stats.os_rates(),
            browser_rates: stats.browser_rates(),
            peak_times: stats.peak_time_attendance(),
            peak_clients: stats.peak_client_attendance(),
            domains: stats.domains().into_iter().collect(),
            crawlers: stats.crawler_shares(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Human-readable report, one section per metric.
impl fmt::Display for Report {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "Access log: {}", self.source)?;
        writeln!(
            out,
            "Lines read: {}, parsed entries: {}, too long: {}, malformed: {}, filtered: {}, blank: {}",
            self.ingest.total_lines,
            self.ingest.parsed,
            self.ingest.too_long,
            self.ingest.malformed,
            self.ingest.filtered,
            self.ingest.blank
        )?;
        if let (Some(min), Some(max)) = (self.ingest.min_line_length, self.ingest.max_line_length) {
            writeln!(out, "Line length: min {min}, max {max}")?;
        }
        for skipped in &self.ingest.skipped {
            writeln!(out, "  skipped line {}: {}", skipped.line_number, skipped.reason)?;
        }
        writeln!(out, "Total traffic: {} bytes", self.total_bytes)?;
        if let Some(ref span) = self.time_span {
            writeln!(
                out,
                "Time span: {} .. {} ({} s)",
                span.earliest.to_rfc3339(),
                span.latest.to_rfc3339(),
                span.seconds
            )?;
        }

        section(out, "Traffic (bytes)")?;
        write_rates(out, &self.traffic_rates, 3)?;

        section(out, "Existing pages")?;
        write_list(out, &self.existing_pages)?;

        section(out, "Non-existing pages")?;
        write_list(out, &self.non_existing_pages)?;

        section(out, "Operating systems")?;
        for (os, rate) in &self.os_rates {
            writeln!(out, "{os} = {rate:.2}")?;
        }

        section(out, "Browsers")?;
        for (browser, rate) in &self.browser_rates {
            writeln!(out, "{browser} = {rate:.6}")?;
        }

        section(out, "User requests")?;
        write_rates(out, &self.user_request_rates, 2)?;

        section(out, "Error requests")?;
        write_rates(out, &self.error_request_rates, 2)?;

        section(out, "Requests per visitor")?;
        match self.user_attendance_rate {
            Some(rate) => writeln!(out, "{rate:.2}")?,
            None => writeln!(out, "n/a")?,
        }

        section(out, "Peak attendance")?;
        for (time, count) in &self.peak_times {
            writeln!(out, "{} - {count}", time.to_rfc3339())?;
        }

        section(out, "Domains")?;
        write_list(out, &self.domains)?;

        section(out, "Busiest clients")?;
        for (client, count) in &self.peak_clients {
            writeln!(out, "{client} - {count}")?;
        }

        section(out, "Crawlers")?;
        if self.crawlers.is_empty() {
            writeln!(out, "(none)")?;
        }
        for (name, share) in &self.crawlers {
            writeln!(
                out,
                "{name}: {} requests, {:.2}%",
                share.count,
                share.share * 100.0
            )?;
        }
        Ok(())
    }
}

fn available(result: LogResult<f64>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "metric unavailable");
            None
        }
    }
}

fn section(out: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(out, "{RULE}")?;
    writeln!(out, "{title}:")
}

fn write_rates(out: &mut fmt::Formatter<'_>, rates: &[Rate], precision: usize) -> fmt::Result {
    for rate in rates {
        match rate.value {
            Some(value) => writeln!(out, "per {} = {value:.precision$}", rate.interval)?,
            None => writeln!(out, "per {} = n/a (empty time span)", rate.interval)?,
        }
    }
    Ok(())
}

fn write_list(out: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return writeln!(out, "(none)");
    }
    for item in items {
        writeln!(out, "{item}")?;
    }
    Ok(())
}
