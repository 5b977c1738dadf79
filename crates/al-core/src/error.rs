//! Access log error types.

use thiserror::Error;

/// Errors that can occur while reading, parsing or summarizing access logs.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("source not found: {0}")]
    NotFound(String),

    #[error("not a regular file: {0}")]
    NotAFile(String),

    #[error("line length {length} exceeds the maximum of {max} characters")]
    LineTooLong { length: usize, max: usize },

    #[error("parse error on line {line_number}: {cause} (line: {raw:?})")]
    Parse {
        line_number: usize,
        raw: String,
        #[source]
        cause: ParseCause,
    },

    #[error("time span is empty: at least two distinct timestamps are required")]
    EmptySpan,

    #[error("no human visitors recorded")]
    NoVisitors,
}

/// Why a single line could not be turned into a `LogEntry`.
#[derive(Debug, Error)]
pub enum ParseCause {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` expected a {expected} token, found {found:?}")]
    UnexpectedToken {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("unterminated {0} token")]
    Unterminated(&'static str),

    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("invalid number in field `{field}` ({value:?}): {source}")]
    Number {
        field: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Convenience alias for access log results.
pub type LogResult<T> = Result<T, LogError>;
