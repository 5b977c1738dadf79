//! Log source abstraction — read access log lines from files or mocks.

use async_trait::async_trait;

use crate::error::{LogError, LogResult};

/// Abstraction for reading the raw lines of an access log.
///
/// Enables mocking for tests and swappable backends.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Read all lines from the given path, in order.
    async fn read_lines(&self, path: &str) -> LogResult<Vec<String>>;

    /// Check if a source path exists and is a readable file.
    async fn exists(&self, path: &str) -> bool;
}

/// Reads logs from the local filesystem.
pub struct FileLogSource;

#[async_trait]
impl LogSource for FileLogSource {
    async fn read_lines(&self, path: &str) -> LogResult<Vec<String>> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| io_error(path, e))?;
        if !metadata.is_file() {
            return Err(LogError::NotAFile(path.to_string()));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
        Ok(split_lines(&bytes))
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

/// Split raw file contents into lines, decoding each one on its own so a bad
/// byte only damages the line it sits on. `\r\n` endings are accepted.
fn split_lines(bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}

fn io_error(path: &str, e: std::io::Error) -> LogError {
    if e.kind() == std::io::ErrorKind::NotFound {
        LogError::NotFound(path.to_string())
    } else {
        LogError::Io(format!("{path}: {e}"))
    }
}
