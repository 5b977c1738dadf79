//! Access log analysis core.
//!
//! Parses combined-format access log lines into structured entries, classifies
//! user agents into OS/browser/bot labels, and folds entries into traffic,
//! audience and client-software statistics. Reading files and rendering
//! reports stay outside: callers supply a `LogSource` and a `LineGate`.

pub mod classifier;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod mock;
pub mod parsers;
pub mod source;
pub mod stats;
pub mod types;

// Re-export key types for convenience
pub use error::{LogError, LogResult, ParseCause};
pub use gate::{AcceptAll, LineGate, MaxLengthGate};
pub use ingest::{IngestSummary, SkipKind, SkippedLine, ingest};
pub use mock::MockLogSource;
pub use source::{FileLogSource, LogSource};
pub use stats::Statistics;
pub use types::{BrowserFamily, ClientDescriptor, HttpMethod, LogEntry, OsFamily, TimeInterval};
