//! Waits until at least one task set is wholly finished

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::backoff::{Backoff, Sleeper, ThreadSleeper};
use crate::error::{CollectError, PollError};
use crate::query::TaskStateQuery;
use crate::reporter::{PollEvent, PollReporter, TracingReporter};
use crate::task::{TaskId, TaskSet};

/// Result of a successful `collect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOutcome {
    /// Sets whose every task is finished, in submission order
    pub finished_sets: Vec<TaskSet>,
    /// Attempt counter to hand to the next `collect`
    pub attempts: u32,
}

/// Polls a task-state query until some submitted set is complete.
///
/// The poller keeps no state between calls; backoff continuity across
/// invocations is carried by the `attempts` value.
pub struct TaskSetPoller<Q, S = ThreadSleeper> {
    query: Q,
    sleeper: S,
    backoff: Backoff,
    reporter: Arc<dyn PollReporter>,
}

impl<Q: TaskStateQuery> TaskSetPoller<Q> {
    /// Create a poller that sleeps on the current thread
    pub fn new(query: Q) -> Self {
        Self::with_sleeper(query, ThreadSleeper)
    }
}

impl<Q: TaskStateQuery, S: Sleeper> TaskSetPoller<Q, S> {
    /// Create a poller with a custom sleeper
    pub fn with_sleeper(query: Q, sleeper: S) -> Self {
        Self {
            query,
            sleeper,
            backoff: Backoff::default(),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Set the backoff schedule
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the progress reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn PollReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Block until at least one of `task_sets` is finished.
    ///
    /// Returns every set finished in the first round where any is, without
    /// waiting for the rest. A failed query aborts immediately; the error
    /// carries the attempt count reached.
    pub fn collect(
        &self,
        task_sets: &[TaskSet],
        start_attempts: u32,
    ) -> Result<CollectOutcome, CollectError> {
        let all_ids = unique_ids(task_sets).map_err(|error| CollectError {
            attempts: start_attempts,
            error,
        })?;
        let mut finished: HashSet<TaskId> = HashSet::new();
        let mut attempts = start_attempts;

        loop {
            let mut unfinished: Vec<TaskId> = all_ids
                .iter()
                .filter(|id| !finished.contains(*id))
                .cloned()
                .collect();
            unfinished.sort();

            self.reporter.report(&PollEvent::RoundStarted {
                attempts,
                unfinished: unfinished.len(),
            });

            let states = match self.query.query_states(&unfinished) {
                Ok(states) if states.len() == unfinished.len() => states,
                Ok(states) => {
                    let error = PollError::ProtocolMismatch {
                        requested: unfinished.len(),
                        returned: states.len(),
                    };
                    return Err(self.query_failed(attempts, error));
                }
                Err(error) => return Err(self.query_failed(attempts, error)),
            };

            let newly_finished: Vec<TaskId> = unfinished
                .into_iter()
                .zip(states)
                .filter(|(_, state)| state.is_finished())
                .map(|(id, _)| id)
                .collect();

            if !newly_finished.is_empty() {
                finished.extend(newly_finished.iter().cloned());
                self.reporter.report(&PollEvent::TasksFinished {
                    ids: newly_finished,
                });
            }

            let finished_sets: Vec<TaskSet> = task_sets
                .iter()
                .filter(|set| set.is_finished_in(&finished))
                .cloned()
                .collect();

            if !finished_sets.is_empty() {
                self.reporter.report(&PollEvent::SetsFound {
                    sets: finished_sets.clone(),
                    attempts,
                });
                return Ok(CollectOutcome {
                    finished_sets,
                    attempts,
                });
            }

            attempts = attempts.saturating_add(1);
            let delay = self.backoff.delay_for(attempts);
            self.reporter.report(&PollEvent::Backoff { attempts, delay });
            self.sleeper.sleep(delay);
        }
    }

    fn query_failed(&self, attempts: u32, error: PollError) -> CollectError {
        self.reporter.report(&PollEvent::QueryFailed {
            attempts,
            error: error.to_string(),
        });
        CollectError { attempts, error }
    }
}

/// Flatten the batch, rejecting duplicates and an empty batch
fn unique_ids(task_sets: &[TaskSet]) -> Result<Vec<TaskId>, PollError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for id in task_sets.iter().flat_map(|set| set.ids()) {
        if !seen.insert(id) {
            return Err(PollError::DuplicateTask(id.clone()));
        }
        ids.push(id.clone());
    }

    if ids.is_empty() {
        return Err(PollError::NoTasks);
    }

    debug!(sets = task_sets.len(), tasks = ids.len(), "polling task sets");
    Ok(ids)
}
