//! Error types for test result merging

use std::path::PathBuf;
use thiserror::Error;

/// Result type for test result operations
pub type Result<T> = std::result::Result<T, ResultsError>;

/// Test result merging errors
#[derive(Debug, Error)]
pub enum ResultsError {
    /// Nothing to merge
    #[error("No test results to merge")]
    NoInputs,

    /// The documents agree with each other but use a format version we do not read
    #[error("Unsupported test results version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Two documents disagree on a schema field
    #[error("Cannot merge test results with different {field}: {first:?} vs {other:?}")]
    SchemaMismatch {
        field: &'static str,
        first: String,
        other: String,
    },

    /// Summing a failure count exceeded `u64`
    #[error("Failure count for {status} overflows when merged")]
    CountOverflow { status: String },

    /// A shard's result file could not be parsed
    #[error("Invalid test results in {path}: {reason}")]
    InvalidShard { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
