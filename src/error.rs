//! Error types for sep-eval operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sep-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting or aggregating evaluation scores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A track record is valid JSON but lacks the expected structure.
    #[error("Malformed record for track {track}: {reason}")]
    MalformedRecord {
        /// Track the record was supplied for.
        track: String,
        /// What is missing or has the wrong type.
        reason: String,
    },

    /// A track record file is not valid JSON.
    #[error("JSON parse error in {origin}: {source}")]
    Parse {
        /// File path or track identifier the text came from.
        origin: String,
        /// Underlying parser error.
        source: serde_json::Error,
    },

    /// The directory to scan for evaluation files does not exist.
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Aggregation function name is not one of `mean` or `median`.
    #[error("Unsupported aggregation: {0} (expected \"mean\" or \"median\")")]
    UnsupportedAggregation(String),

    /// A persisted score table has an invalid row.
    #[error("Malformed table at line {line}: {reason}")]
    MalformedTable {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// Fetching a remote baseline table failed.
    #[error("Baseline fetch failed: {0}")]
    Baseline(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
