//! Combined log format tokenizer.
//!
//! `IP IDENT USER [DD/Mon/YYYY:HH:MM:SS +ZZZZ] "METHOD PATH PROTOCOL" STATUS SIZE "REFERER" "USER-AGENT"`
//!
//! The line is scanned left to right into bare, bracketed and quoted tokens,
//! which are matched one-for-one against [`GRAMMAR`]. Trailing tokens past
//! the user agent are ignored.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::classifier;
use crate::error::{LogError, LogResult, ParseCause};
use crate::types::{HttpMethod, LogEntry};

const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:\[(?P<bracketed>[^\]]*)\]|"(?P<quoted>[^"]*)"|(?P<bare>[^\s"\[]+))"#)
        .unwrap()
});

// ── Grammar ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Bare,
    Bracketed,
    Quoted,
}

impl TokenKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Bracketed => "bracketed",
            Self::Quoted => "quoted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ClientAddress,
    Identity,
    User,
    Timestamp,
    Request,
    Status,
    Size,
    Referer,
    UserAgent,
}

impl Field {
    fn name(&self) -> &'static str {
        match self {
            Self::ClientAddress => "client_address",
            Self::Identity => "identity",
            Self::User => "user",
            Self::Timestamp => "timestamp",
            Self::Request => "request",
            Self::Status => "status",
            Self::Size => "size",
            Self::Referer => "referer",
            Self::UserAgent => "user_agent",
        }
    }
}

/// Positional layout of a combined log line.
const GRAMMAR: [(Field, TokenKind); 9] = [
    (Field::ClientAddress, TokenKind::Bare),
    (Field::Identity, TokenKind::Bare),
    (Field::User, TokenKind::Bare),
    (Field::Timestamp, TokenKind::Bracketed),
    (Field::Request, TokenKind::Quoted),
    (Field::Status, TokenKind::Bare),
    (Field::Size, TokenKind::Bare),
    (Field::Referer, TokenKind::Quoted),
    (Field::UserAgent, TokenKind::Quoted),
];

// ── Scanner ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
}

impl<'a> Token<'a> {
    fn expect(self, field: Field, kind: TokenKind) -> Result<&'a str, ParseCause> {
        if self.kind == kind {
            Ok(self.text)
        } else {
            Err(ParseCause::UnexpectedToken {
                field: field.name(),
                expected: kind.as_str(),
                found: self.text.to_string(),
            })
        }
    }
}

struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseCause> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            self.rest = trimmed;
            return Ok(None);
        }

        let Some(caps) = RE_TOKEN.captures(self.rest) else {
            return Err(if trimmed.starts_with('"') {
                ParseCause::Unterminated(TokenKind::Quoted.as_str())
            } else {
                ParseCause::Unterminated(TokenKind::Bracketed.as_str())
            });
        };

        let token = if let Some(m) = caps.name("bracketed") {
            Token {
                kind: TokenKind::Bracketed,
                text: m.as_str(),
            }
        } else if let Some(m) = caps.name("quoted") {
            Token {
                kind: TokenKind::Quoted,
                text: m.as_str(),
            }
        } else {
            Token {
                kind: TokenKind::Bare,
                text: caps.name("bare").map_or("", |m| m.as_str()),
            }
        };

        // Group 0 always exists on a successful match.
        let consumed = caps.get(0).map_or(self.rest.len(), |m| m.end());
        self.rest = &self.rest[consumed..];
        Ok(Some(token))
    }
}

// ── Parsing ───────────────────────────────────────────────────

/// Parse one combined-format line into a `LogEntry`.
///
/// Any missing, misshapen or unconvertible field fails the whole line.
pub fn parse_line(line: &str, line_number: usize) -> LogResult<LogEntry> {
    build_entry(line, line_number).map_err(|cause| LogError::Parse {
        line_number,
        raw: line.to_string(),
        cause,
    })
}

fn build_entry(line: &str, line_number: usize) -> Result<LogEntry, ParseCause> {
    let mut scanner = Scanner::new(line);
    let mut values = [""; GRAMMAR.len()];

    for (slot, (field, kind)) in values.iter_mut().zip(GRAMMAR) {
        let token = scanner
            .next_token()?
            .ok_or(ParseCause::MissingField(field.name()))?;
        *slot = token.expect(field, kind)?;
    }

    let [client, _identity, _user, time, request, status, size, referer, agent] = values;

    let timestamp = parse_timestamp(time)?;
    let (method, request_path) = split_request(request);
    let response_code = parse_number::<u16>(Field::Status, status)?;
    let response_size = parse_number::<u64>(Field::Size, size)?;

    Ok(LogEntry {
        client_address: client.to_string(),
        timestamp,
        method,
        request_path,
        response_code,
        response_size,
        referer: referer.to_string(),
        client: classifier::classify(agent),
        line_number,
    })
}

/// Parse `10/Oct/2020:13:55:36 -0700`, normalizing to UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseCause> {
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ParseCause::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Split a request line on its first space when it starts with a known verb.
fn split_request(request: &str) -> (Option<HttpMethod>, String) {
    if let Some((verb, rest)) = request.split_once(' ') {
        if let Some(method) = HttpMethod::from_verb(verb) {
            return (Some(method), rest.to_string());
        }
    }
    (None, request.to_string())
}

fn parse_number<T>(field: Field, value: &str) -> Result<T, ParseCause>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value.parse::<T>().map_err(|source| ParseCause::Number {
        field: field.name(),
        value: value.to_string(),
        source,
    })
}
