//! Error types for profile merging

use std::path::PathBuf;
use thiserror::Error;

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Profile merging errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The merge tool ran and exited non-zero; `output` is its combined
    /// stdout and stderr, unmodified.
    #[error("Profile merge failed (exit code {exit_code:?}):\n{output}")]
    MergeFailed {
        exit_code: Option<i32>,
        output: String,
    },

    /// The merge tool could not be started
    #[error("Merge tool not found: {0}")]
    ToolNotFound(PathBuf),

    /// The file name filter is not a valid regex
    #[error("Invalid profile filename pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Walking the input directory failed
    #[error("Failed to scan for profiles: {0}")]
    Discovery(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
