//! Access log line parsers.
//!
//! Only the combined log format is supported; see [`combined`]. Batches of
//! lines go through [`crate::ingest`], which adds length checks and per-line
//! skip reporting.

pub mod combined;

pub use combined::parse_line;
