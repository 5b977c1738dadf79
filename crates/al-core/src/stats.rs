//! Running traffic, audience and client-software statistics over log entries.
//!
//! `Statistics` is fed one entry at a time through [`Statistics::add_entry`]
//! and queried through pure read methods. Rate queries divide by the time
//! span between the earliest and latest entry and return
//! [`LogError::EmptySpan`] when that span is zero.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::LazyLock;

use crate::error::{LogError, LogResult};
use crate::types::{BrowserFamily, LogEntry, OsFamily, TimeInterval};

// [scheme://][www.]host[/...], host having at least two labels
static RE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9+.\-]*://)?(?:www\.)?(?P<host>[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+)(?:[/:?#]|$)",
    )
    .unwrap()
});

/// Requests attributed to a single crawler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrawlerShare {
    pub count: u64,
    /// Fraction of all recorded entries.
    pub share: f64,
}

/// Accumulated statistics over a sequence of log entries.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    total_bytes: u64,
    time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    total_user_requests: u64,
    total_error_requests: u64,
    existing_pages: BTreeSet<String>,
    non_existing_pages: BTreeSet<String>,
    os_counts: BTreeMap<OsFamily, u64>,
    browser_counts: BTreeMap<BrowserFamily, u64>,
    crawler_counts: BTreeMap<String, u64>,
    domains: BTreeSet<String>,
    entries: Vec<LogEntry>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one entry. Adding the same entry twice counts it twice.
    pub fn add_entry(&mut self, entry: LogEntry) {
        self.total_bytes += entry.response_size;

        self.time_span = Some(match self.time_span {
            Some((earliest, latest)) => (
                earliest.min(entry.timestamp),
                latest.max(entry.timestamp),
            ),
            None => (entry.timestamp, entry.timestamp),
        });

        if !entry.is_bot() {
            self.total_user_requests += 1;
        }
        if entry.is_error() {
            self.total_error_requests += 1;
        }

        if entry.has_referer() {
            match entry.response_code {
                200 => {
                    self.existing_pages.insert(entry.referer.clone());
                }
                404 => {
                    self.non_existing_pages.insert(entry.referer.clone());
                }
                _ => {}
            }
        }

        *self.os_counts.entry(entry.client.os).or_default() += 1;
        *self.browser_counts.entry(entry.client.browser).or_default() += 1;
        if let Some(ref crawler) = entry.client.crawler {
            *self.crawler_counts.entry(crawler.clone()).or_default() += 1;
        }

        if let Some(domain) = extract_domain(&entry.referer) {
            self.domains.insert(domain);
        }

        self.entries.push(entry);
    }

    /// Fold another accumulator into this one, as if its entries had been
    /// added here after the existing ones.
    pub fn merge(&mut self, other: Statistics) {
        for entry in other.entries {
            self.add_entry(entry);
        }
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ── Plain accessors ───────────────────────────────────────

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Earliest and latest timestamps seen, if any.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.time_span
    }

    pub fn total_user_requests(&self) -> u64 {
        self.total_user_requests
    }

    pub fn total_error_requests(&self) -> u64 {
        self.total_error_requests
    }

    pub fn os_counts(&self) -> &BTreeMap<OsFamily, u64> {
        &self.os_counts
    }

    pub fn browser_counts(&self) -> &BTreeMap<BrowserFamily, u64> {
        &self.browser_counts
    }

    pub fn crawler_counts(&self) -> &BTreeMap<String, u64> {
        &self.crawler_counts
    }

    pub fn existing_pages(&self) -> BTreeSet<String> {
        self.existing_pages.clone()
    }

    pub fn non_existing_pages(&self) -> BTreeSet<String> {
        self.non_existing_pages.clone()
    }

    pub fn domains(&self) -> BTreeSet<String> {
        self.domains.clone()
    }

    // ── Rates ─────────────────────────────────────────────────

    /// Whole seconds between the earliest and latest entry; errors when zero.
    pub fn span_seconds(&self) -> LogResult<i64> {
        self.time_span
            .map(|(earliest, latest)| (latest - earliest).num_seconds())
            .filter(|secs| *secs > 0)
            .ok_or(LogError::EmptySpan)
    }

    fn per_interval(&self, amount: u64, interval: TimeInterval) -> LogResult<f64> {
        let span = self.span_seconds()? as f64;
        Ok(amount as f64 / (span / interval.seconds() as f64))
    }

    /// Bytes served per interval.
    pub fn traffic_rate(&self, interval: TimeInterval) -> LogResult<f64> {
        self.per_interval(self.total_bytes, interval)
    }

    /// Non-bot requests per interval.
    pub fn user_request_rate(&self, interval: TimeInterval) -> LogResult<f64> {
        self.per_interval(self.total_user_requests, interval)
    }

    /// 4xx/5xx responses per interval.
    pub fn error_request_rate(&self, interval: TimeInterval) -> LogResult<f64> {
        self.per_interval(self.total_error_requests, interval)
    }

    /// Average number of requests per distinct human client address.
    pub fn user_attendance_rate(&self) -> LogResult<f64> {
        let visitors: HashSet<&str> = self
            .entries
            .iter()
            .filter(|e| !e.is_bot())
            .map(|e| e.client_address.as_str())
            .collect();
        if visitors.is_empty() {
            return Err(LogError::NoVisitors);
        }
        Ok(self.total_user_requests as f64 / visitors.len() as f64)
    }

    pub fn os_rates(&self) -> BTreeMap<OsFamily, f64> {
        label_rates(&self.os_counts)
    }

    pub fn browser_rates(&self) -> BTreeMap<BrowserFamily, f64> {
        label_rates(&self.browser_counts)
    }

    /// Request count and share of all entries for each crawler.
    pub fn crawler_shares(&self) -> BTreeMap<String, CrawlerShare> {
        let total = self.entries.len() as f64;
        self.crawler_counts
            .iter()
            .map(|(name, &count)| {
                (
                    name.clone(),
                    CrawlerShare {
                        count,
                        share: count as f64 / total,
                    },
                )
            })
            .collect()
    }

    // ── Peaks ─────────────────────────────────────────────────

    /// Timestamps with the most human requests, with that count. Ties are
    /// all returned.
    pub fn peak_time_attendance(&self) -> BTreeMap<DateTime<Utc>, usize> {
        peaks(
            self.entries
                .iter()
                .filter(|e| !e.is_bot())
                .map(|e| e.timestamp),
        )
    }

    /// Human client addresses with the most requests, with that count.
    pub fn peak_client_attendance(&self) -> BTreeMap<String, usize> {
        peaks(
            self.entries
                .iter()
                .filter(|e| !e.is_bot())
                .map(|e| e.client_address.clone()),
        )
    }
}

/// Each label's count divided by the sum of all counts.
pub fn label_rates<K: Ord + Clone>(counts: &BTreeMap<K, u64>) -> BTreeMap<K, f64> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .iter()
        .map(|(label, &count)| (label.clone(), count as f64 / total as f64))
        .collect()
}

/// Group keys, count them and keep every key sharing the maximum count.
fn peaks<K: Ord + Hash>(keys: impl Iterator<Item = K>) -> BTreeMap<K, usize> {
    let mut counts: HashMap<K, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let Some(max) = counts.values().copied().max() else {
        return BTreeMap::new();
    };
    counts.into_iter().filter(|(_, c)| *c == max).collect()
}

/// Registrable domain of a referer: scheme and leading `www.` stripped, host
/// up to the first `/`, `:`, `?` or `#`, trailing `.www` label dropped.
pub fn extract_domain(referer: &str) -> Option<String> {
    // Hosts are case-insensitive; fold before matching so `WWW.` is stripped too.
    let referer = referer.to_ascii_lowercase();
    let caps = RE_DOMAIN.captures(&referer)?;
    let host = caps.name("host")?.as_str();
    let host = host.strip_suffix(".www").unwrap_or(host);
    if host.contains('.') {
        Some(host.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientDescriptor, HttpMethod};
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s).unwrap()
    }

    fn entry(ip: &str, ts: DateTime<Utc>, code: u16, size: u64, referer: &str) -> LogEntry {
        LogEntry {
            client_address: ip.into(),
            timestamp: ts,
            method: Some(HttpMethod::Get),
            request_path: "/ HTTP/1.1".into(),
            response_code: code,
            response_size: size,
            referer: referer.into(),
            client: ClientDescriptor {
                os: OsFamily::Windows,
                browser: BrowserFamily::Chrome,
                is_bot: false,
                crawler: None,
            },
            line_number: 1,
        }
    }

    fn bot(ip: &str, ts: DateTime<Utc>) -> LogEntry {
        let mut e = entry(ip, ts, 200, 10, "-");
        e.client = ClientDescriptor {
            os: OsFamily::Unknown,
            browser: BrowserFamily::Unknown,
            is_bot: true,
            crawler: Some("Googlebot".into()),
        };
        e
    }

    #[test]
    fn empty_accumulator() {
        let stats = Statistics::new();
        assert!(stats.is_empty());
        assert!(stats.time_span().is_none());
        assert!(matches!(
            stats.traffic_rate(TimeInterval::Hour),
            Err(LogError::EmptySpan)
        ));
        assert!(matches!(stats.user_attendance_rate(), Err(LogError::NoVisitors)));
        assert!(stats.peak_time_attendance().is_empty());
        assert!(stats.os_rates().is_empty());
    }

    #[test]
    fn traffic_rate_over_one_hour() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 1000, "-"));
        stats.add_entry(entry("b", at(13, 0, 0), 200, 2600, "-"));

        assert_eq!(stats.span_seconds().unwrap(), 3600);
        assert_eq!(stats.traffic_rate(TimeInterval::Hour).unwrap(), 3600.0);
        assert_eq!(stats.traffic_rate(TimeInterval::Minute).unwrap(), 60.0);
        assert_eq!(stats.traffic_rate(TimeInterval::Second).unwrap(), 1.0);
        assert_eq!(stats.traffic_rate(TimeInterval::Day).unwrap(), 86400.0);
    }

    #[test]
    fn single_timestamp_span_is_an_error() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 1000, "-"));
        stats.add_entry(entry("b", at(12, 0, 0), 200, 1000, "-"));
        assert!(matches!(
            stats.traffic_rate(TimeInterval::Hour),
            Err(LogError::EmptySpan)
        ));
        assert!(stats.user_request_rate(TimeInterval::Hour).is_err());
        assert!(stats.error_request_rate(TimeInterval::Hour).is_err());
    }

    #[test]
    fn span_is_order_independent() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 30, 0), 200, 1, "-"));
        stats.add_entry(entry("a", at(12, 0, 0), 200, 1, "-"));
        stats.add_entry(entry("a", at(12, 15, 0), 200, 1, "-"));
        assert_eq!(stats.time_span(), Some((at(12, 0, 0), at(12, 30, 0))));
    }

    #[test]
    fn user_and_error_rates() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(entry("a", at(12, 30, 0), 404, 0, "-"));
        stats.add_entry(entry("b", at(13, 0, 0), 503, 0, "-"));
        stats.add_entry(bot("g", at(13, 0, 0)));

        assert_eq!(stats.total_user_requests(), 3);
        assert_eq!(stats.total_error_requests(), 2);
        assert_eq!(stats.user_request_rate(TimeInterval::Hour).unwrap(), 3.0);
        assert_eq!(stats.error_request_rate(TimeInterval::Hour).unwrap(), 2.0);
    }

    #[test]
    fn error_range_is_400_to_599() {
        let mut stats = Statistics::new();
        for code in [200, 302, 399, 400, 499, 500, 599, 600] {
            stats.add_entry(entry("a", at(12, 0, 0), code, 0, "-"));
        }
        assert_eq!(stats.total_error_requests(), 4);
    }

    #[test]
    fn attendance_counts_distinct_humans() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(entry("a", at(12, 1, 0), 200, 0, "-"));
        stats.add_entry(entry("a", at(12, 2, 0), 200, 0, "-"));
        stats.add_entry(entry("b", at(12, 3, 0), 200, 0, "-"));
        stats.add_entry(bot("g", at(12, 4, 0)));
        assert_eq!(stats.user_attendance_rate().unwrap(), 2.0);
    }

    #[test]
    fn only_bots_have_no_visitors() {
        let mut stats = Statistics::new();
        stats.add_entry(bot("g", at(12, 0, 0)));
        assert!(matches!(stats.user_attendance_rate(), Err(LogError::NoVisitors)));
        assert!(stats.peak_client_attendance().is_empty());
    }

    #[test]
    fn pages_by_status_and_referer() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "http://example.com/ok"));
        stats.add_entry(entry("a", at(12, 0, 0), 404, 0, "http://example.com/gone"));
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(entry("a", at(12, 0, 0), 404, 0, ""));
        stats.add_entry(entry("a", at(12, 0, 0), 301, 0, "http://example.com/moved"));

        let existing = stats.existing_pages();
        let missing = stats.non_existing_pages();
        assert_eq!(existing.len(), 1);
        assert!(existing.contains("http://example.com/ok"));
        assert_eq!(missing.len(), 1);
        assert!(missing.contains("http://example.com/gone"));
    }

    #[test]
    fn page_sets_are_copies() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "http://example.com/ok"));
        let mut copy = stats.existing_pages();
        copy.clear();
        assert_eq!(stats.existing_pages().len(), 1);
    }

    #[test]
    fn label_rates_sum_to_one() {
        let mut counts = BTreeMap::new();
        counts.insert(OsFamily::Windows, 3);
        counts.insert(OsFamily::Linux, 2);
        counts.insert(OsFamily::Unknown, 2);
        let rates = label_rates(&counts);
        let sum: f64 = rates.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((rates[&OsFamily::Windows] - 3.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn label_rates_of_empty_map_is_empty() {
        let counts: BTreeMap<BrowserFamily, u64> = BTreeMap::new();
        assert!(label_rates(&counts).is_empty());
    }

    #[test]
    fn os_and_browser_counts_include_bots() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(bot("g", at(12, 0, 0)));
        assert_eq!(stats.os_counts()[&OsFamily::Windows], 1);
        assert_eq!(stats.os_counts()[&OsFamily::Unknown], 1);
        assert_eq!(stats.browser_rates()[&BrowserFamily::Chrome], 0.5);
    }

    #[test]
    fn peak_time_includes_all_ties() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(entry("b", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(entry("c", at(12, 5, 0), 200, 0, "-"));
        stats.add_entry(entry("d", at(12, 5, 0), 200, 0, "-"));
        stats.add_entry(entry("e", at(12, 9, 0), 200, 0, "-"));
        stats.add_entry(bot("g", at(12, 9, 0)));
        stats.add_entry(bot("g", at(12, 9, 0)));

        let peaks = stats.peak_time_attendance();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[&at(12, 0, 0)], 2);
        assert_eq!(peaks[&at(12, 5, 0)], 2);
    }

    #[test]
    fn peak_client_excludes_bots() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(entry("a", at(12, 1, 0), 200, 0, "-"));
        stats.add_entry(entry("b", at(12, 2, 0), 200, 0, "-"));
        for m in 0..5 {
            stats.add_entry(bot("g", at(12, m, 30)));
        }

        let peaks = stats.peak_client_attendance();
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks["a"], 2);
    }

    #[test]
    fn add_entry_is_not_idempotent() {
        let e = entry("a", at(12, 0, 0), 404, 500, "http://example.com/x");
        let mut stats = Statistics::new();
        stats.add_entry(e.clone());
        stats.add_entry(e);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats.total_bytes(), 1000);
        assert_eq!(stats.total_user_requests(), 2);
        assert_eq!(stats.total_error_requests(), 2);
        assert_eq!(stats.os_counts()[&OsFamily::Windows], 2);
        assert_eq!(stats.peak_client_attendance()["a"], 2);
        // Sets stay sets.
        assert_eq!(stats.non_existing_pages().len(), 1);
    }

    #[test]
    fn crawler_shares() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        stats.add_entry(bot("g", at(12, 1, 0)));
        stats.add_entry(entry("b", at(12, 2, 0), 200, 0, "-"));
        stats.add_entry(bot("g", at(12, 3, 0)));

        let shares = stats.crawler_shares();
        assert_eq!(shares["Googlebot"].count, 2);
        assert_eq!(shares["Googlebot"].share, 0.5);
    }

    #[test]
    fn merge_matches_sequential_adds() {
        let entries = vec![
            entry("a", at(12, 0, 0), 200, 10, "http://www.example.com/"),
            entry("b", at(12, 30, 0), 404, 20, "https://other.org/missing"),
            bot("g", at(13, 0, 0)),
        ];

        let mut whole = Statistics::new();
        for e in entries.iter().cloned() {
            whole.add_entry(e);
        }

        let mut left = Statistics::new();
        left.add_entry(entries[2].clone());
        let mut right = Statistics::new();
        right.add_entry(entries[0].clone());
        right.add_entry(entries[1].clone());
        left.merge(right);

        assert_eq!(left.len(), whole.len());
        assert_eq!(left.total_bytes(), whole.total_bytes());
        assert_eq!(left.time_span(), whole.time_span());
        assert_eq!(left.domains(), whole.domains());
        assert_eq!(left.os_counts(), whole.os_counts());
        assert_eq!(left.peak_client_attendance(), whole.peak_client_attendance());
    }

    #[test]
    fn clear_resets_everything() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 10, "http://example.com/"));
        stats.clear();
        assert!(stats.is_empty());
        assert_eq!(stats.total_bytes(), 0);
        assert!(stats.domains().is_empty());
        assert!(stats.existing_pages().is_empty());
        assert!(stats.time_span().is_none());
    }

    #[test]
    fn domains_are_collected() {
        let mut stats = Statistics::new();
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "https://www.example.com/a"));
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "http://example.com/b"));
        stats.add_entry(entry("a", at(12, 0, 0), 200, 0, "-"));
        assert_eq!(
            stats.domains().into_iter().collect::<Vec<_>>(),
            vec!["example.com".to_string()]
        );
    }

    #[test]
    fn extract_domain_shapes() {
        assert_eq!(extract_domain("https://www.example.com/path").as_deref(), Some("example.com"));
        assert_eq!(extract_domain("http://blog.example.org/post/1").as_deref(), Some("blog.example.org"));
        assert_eq!(extract_domain("www.example.com").as_deref(), Some("example.com"));
        assert_eq!(extract_domain("example.com:8080/x").as_deref(), Some("example.com"));
        assert_eq!(extract_domain("https://example.com.www/").as_deref(), Some("example.com"));
        assert_eq!(extract_domain("https://site.com?q=1").as_deref(), Some("site.com"));
        assert_eq!(extract_domain("-"), None);
        assert_eq!(extract_domain(""), None);
        assert_eq!(extract_domain("http://localhost/"), None);
        assert_eq!(extract_domain("/relative/path"), None);
    }

    #[test]
    fn domains_fold_case() {
        assert_eq!(extract_domain("HTTP://WWW.Example.COM/Path").as_deref(), Some("example.com"));

        let mut stats = Statistics::new();
        stats.add_entry(entry("10.0.0.1", at(12, 0, 0), 200, 1, "http://WWW.Example.COM/"));
        stats.add_entry(entry("10.0.0.2", at(12, 0, 1), 200, 1, "http://www.example.com/"));
        assert_eq!(stats.domains().len(), 1);
        assert!(stats.domains().contains("example.com"));
    }
}
