//! Core access log types: parsed entries, client descriptors, rate intervals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── HTTP Method ───────────────────────────────────────────────

/// Request verbs recognized at the start of a request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
    Get,
    Put,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [Self::Post, Self::Get, Self::Put, Self::Head];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Head => "HEAD",
        }
    }

    /// Exact, case-sensitive match against a request verb.
    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == verb)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Client labels ─────────────────────────────────────────────

/// Operating system family derived from a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OsFamily {
    Windows,
    Android,
    Ios,
    Macos,
    Linux,
    Unknown,
}

impl OsFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "WINDOWS",
            Self::Android => "ANDROID",
            Self::Ios => "IOS",
            Self::Macos => "MACOS",
            Self::Linux => "LINUX",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser family derived from a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BrowserFamily {
    Chrome,
    Firefox,
    Edge,
    Opera,
    Safari,
    Ie,
    Unknown,
}

impl BrowserFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "CHROME",
            Self::Firefox => "FIREFOX",
            Self::Edge => "EDGE",
            Self::Opera => "OPERA",
            Self::Safari => "SAFARI",
            Self::Ie => "IE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a raw user agent string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDescriptor {
    pub os: OsFamily,
    pub browser: BrowserFamily,
    pub is_bot: bool,
    /// Crawler product name (e.g. "Googlebot"), only set for bots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler: Option<String>,
}

impl Default for ClientDescriptor {
    fn default() -> Self {
        Self {
            os: OsFamily::Unknown,
            browser: BrowserFamily::Unknown,
            is_bot: false,
            crawler: None,
        }
    }
}

// ── Log Entry ─────────────────────────────────────────────────

/// One parsed line of a combined-format access log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Client IP address or host name.
    pub client_address: String,
    /// Request time, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// Request verb, if the request line started with a recognized one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Request line with the verb stripped (protocol text is kept).
    pub request_path: String,
    pub response_code: u16,
    pub response_size: u64,
    /// Referer header; `-` means none.
    pub referer: String,
    pub client: ClientDescriptor,
    /// 1-based line number in the source.
    pub line_number: usize,
}

impl LogEntry {
    pub fn is_bot(&self) -> bool {
        self.client.is_bot
    }

    /// 4xx and 5xx responses.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.response_code)
    }

    /// A referer carrying more than the single placeholder character.
    pub fn has_referer(&self) -> bool {
        self.referer.chars().count() > 1
    }
}

// ── Time Interval ─────────────────────────────────────────────

/// Unit of time that rate queries are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInterval {
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeInterval {
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "second" | "sec" | "s" => Ok(Self::Second),
            "minute" | "min" | "m" => Ok(Self::Minute),
            "hour" | "h" => Ok(Self::Hour),
            "day" | "d" => Ok(Self::Day),
            other => Err(format!("unknown interval: {other}")),
        }
    }
}
