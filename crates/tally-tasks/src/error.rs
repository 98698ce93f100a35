//! Error types for task-set polling

use thiserror::Error;

use crate::task::TaskId;

/// Result type for polling operations
pub type Result<T> = std::result::Result<T, PollError>;

/// Task-set polling errors
#[derive(Debug, Error)]
pub enum PollError {
    /// The query tool could not be run or exited non-zero
    #[error("Task state query failed: {command} (exit code {exit_code:?})\n{output}")]
    QueryToolFailure {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// The query tool answered with the wrong number of states
    #[error("Task state query returned {returned} states for {requested} task IDs")]
    ProtocolMismatch { requested: usize, returned: usize },

    /// The query tool's output could not be understood
    #[error("Invalid task state response: {0}")]
    InvalidResponse(String),

    /// The submitted batch holds no task IDs at all
    #[error("No task IDs to poll")]
    NoTasks,

    /// A task ID was submitted in more than one place
    #[error("Task ID {0} appears more than once in the submitted task sets")]
    DuplicateTask(TaskId),
}

/// A failed `collect`, carrying the attempt counter reached so a restarted
/// poll can continue the same backoff schedule.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CollectError {
    /// Attempts made before the failure
    pub attempts: u32,
    /// Underlying failure
    #[source]
    pub error: PollError,
}
