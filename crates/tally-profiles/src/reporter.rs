//! Profile merge progress reporting

use std::path::PathBuf;

/// Events emitted while merging profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    /// The merge tool is about to run
    Attempt { inputs: usize, retries_left: u32 },
    /// An input was named in the tool's failure output and dropped
    Excluded { path: PathBuf },
    /// The merge succeeded
    Merged { inputs: usize, excluded: usize },
}

/// Trait for reporting profile merge progress
pub trait ProfileReporter: Send + Sync {
    fn report(&self, event: &ProfileEvent);
}

/// Logs events to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl ProfileReporter for TracingReporter {
    fn report(&self, event: &ProfileEvent) {
        match event {
            ProfileEvent::Attempt { inputs, retries_left } => {
                tracing::debug!(inputs, retries_left, "merging profiles");
            }
            ProfileEvent::Excluded { path } => {
                tracing::warn!("Excluding invalid profile {}", path.display());
            }
            ProfileEvent::Merged { inputs, excluded } => {
                tracing::info!("Merged {} profiles ({} excluded)", inputs, excluded);
            }
        }
    }
}

/// Reporter that collects events (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: std::sync::Mutex<Vec<ProfileEvent>>,
}

impl CollectingReporter {
    pub fn events(&self) -> Vec<ProfileEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProfileReporter for CollectingReporter {
    fn report(&self, event: &ProfileEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
