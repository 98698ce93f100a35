//! Tally Tasks - Task-set completion polling
//!
//! Polls an external task-state query tool until at least one submitted
//! set of shard tasks has wholly finished, backing off exponentially
//! between rounds.

pub mod backoff;
pub mod error;
pub mod poller;
pub mod query;
pub mod reporter;
pub mod task;

pub use backoff::{Backoff, Sleeper, ThreadSleeper};
pub use error::{CollectError, PollError, Result};
pub use poller::{CollectOutcome, TaskSetPoller};
pub use query::{QueryTool, TaskStateQuery};
pub use reporter::{CollectingReporter, PollEvent, PollReporter, TracingReporter};
pub use task::{TaskId, TaskSet, TaskState};
