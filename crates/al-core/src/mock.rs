//! Mock log source for testing — serves pre-loaded access log content.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{LogError, LogResult};
use crate::source::LogSource;

/// A mock log source that serves pre-loaded content by path.
pub struct MockLogSource {
    files: HashMap<String, Vec<String>>,
}

impl MockLogSource {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    /// Add a file with the given lines.
    pub fn add_file(&mut self, path: impl Into<String>, lines: Vec<String>) {
        self.files.insert(path.into(), lines);
    }

    /// Create a mock with a small combined-format access log.
    ///
    /// Ten lines spanning one hour: seven parse, one is blank, one is not an
    /// access log line and one has a `-` size. One of the seven is Googlebot.
    pub fn with_access_sample() -> Self {
        let mut m = Self::new();
        m.add_file("/var/log/nginx/access.log", access_sample());
        m
    }
}

/// Sample lines served by [`MockLogSource::with_access_sample`].
pub fn access_sample() -> Vec<String> {
    vec![
        r#"192.168.1.10 - - [15/Jan/2024:12:00:00 +0000] "GET /index.html HTTP/1.1" 200 5120 "https://www.example.com/start" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36""#.into(),
        r#"192.168.1.11 - - [15/Jan/2024:12:10:00 +0000] "GET /missing.html HTTP/1.1" 404 312 "http://blog.example.org/post/1" "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0""#.into(),
        r#"66.249.66.1 - - [15/Jan/2024:12:15:00 +0000] "GET /robots.txt HTTP/1.1" 200 68 "-" "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)""#.into(),
        r#"192.168.1.10 - - [15/Jan/2024:12:30:00 +0000] "POST /api/login HTTP/1.1" 500 128 "https://www.example.com/login" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36""#.into(),
        "this line is not an access log entry".into(),
        r#"192.168.1.12 - - [15/Jan/2024:12:30:00 +0000] "GET /about HTTP/1.1" 200 2048 "https://news.site.com/" "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1""#.into(),
        r#"192.168.1.13 - - [15/Jan/2024:12:45:00 +0000] "HEAD / HTTP/1.1" 304 - "-" "curl/8.4.0""#.into(),
        r#"192.168.1.10 - - [15/Jan/2024:12:50:00 +0000] "GET /index.html HTTP/1.1" 200 5120 "-" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36""#.into(),
        "".into(),
        r#"192.168.1.11 - - [15/Jan/2024:13:00:00 +0000] "GET /docs HTTP/1.1" 404 312 "-" "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0""#.into(),
    ]
}

impl Default for MockLogSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn read_lines(&self, path: &str) -> LogResult<Vec<String>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LogError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}
