//! Poll progress reporting

use std::time::Duration;

use crate::task::{TaskId, TaskSet};

/// Events emitted while waiting for task sets
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A query round is starting
    RoundStarted {
        attempts: u32,
        unfinished: usize,
    },
    /// Tasks observed finished for the first time
    TasksFinished {
        ids: Vec<TaskId>,
    },
    /// No set is complete yet; sleeping before the next round
    Backoff {
        attempts: u32,
        delay: Duration,
    },
    /// At least one set is complete
    SetsFound {
        sets: Vec<TaskSet>,
        attempts: u32,
    },
    /// The query failed and polling stops
    QueryFailed {
        attempts: u32,
        error: String,
    },
}

/// Trait for reporting poll progress
pub trait PollReporter: Send + Sync {
    /// Handle a poll event
    fn report(&self, event: &PollEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl PollReporter for TracingReporter {
    fn report(&self, event: &PollEvent) {
        match event {
            PollEvent::RoundStarted { attempts, unfinished } => {
                tracing::debug!(attempts, unfinished, "querying task states");
            }
            PollEvent::TasksFinished { ids } => {
                tracing::debug!(count = ids.len(), "tasks finished");
            }
            PollEvent::Backoff { attempts, delay } => {
                tracing::info!(
                    "No task set finished yet, retrying in {}s (attempt {})",
                    delay.as_secs(),
                    attempts
                );
            }
            PollEvent::SetsFound { sets, attempts } => {
                tracing::info!("{} task set(s) finished after {} attempts", sets.len(), attempts);
            }
            PollEvent::QueryFailed { attempts, error } => {
                tracing::error!(attempts, "task state query failed: {}", error);
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: std::sync::Mutex<Vec<PollEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl PollReporter for CollectingReporter {
    fn report(&self, event: &PollEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
