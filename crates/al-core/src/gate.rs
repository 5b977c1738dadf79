//! Line validity gate — decides whether a raw line may be tokenized.

use crate::error::{LogError, LogResult};

/// Default maximum accepted line length, in characters.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Pre-tokenizer check applied to every raw line.
///
/// `Ok(false)` silently filters a line; `Err(LogError::LineTooLong)` rejects
/// it with a reportable reason. Either way the line is never tokenized.
pub trait LineGate {
    fn accept(&self, line: &str) -> LogResult<bool>;
}

/// Rejects lines longer than a fixed number of characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthGate {
    max: usize,
}

impl MaxLengthGate {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl Default for MaxLengthGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineGate for MaxLengthGate {
    fn accept(&self, line: &str) -> LogResult<bool> {
        let length = line.chars().count();
        if length > self.max {
            return Err(LogError::LineTooLong {
                length,
                max: self.max,
            });
        }
        Ok(true)
    }
}

/// Accepts every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LineGate for AcceptAll {
    fn accept(&self, _line: &str) -> LogResult<bool> {
        Ok(true)
    }
}

impl<F> LineGate for F
where
    F: Fn(&str) -> LogResult<bool>,
{
    fn accept(&self, line: &str) -> LogResult<bool> {
        self(line)
    }
}
