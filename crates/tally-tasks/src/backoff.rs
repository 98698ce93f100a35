//! Poll-round backoff schedule

use std::time::Duration;

/// Exponential backoff capped at a maximum delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    max_delay_secs: u64,
}

impl Backoff {
    /// Default cap between two poll rounds
    pub const DEFAULT_MAX_DELAY_SECS: u64 = 120;

    pub fn new(max_delay_secs: u64) -> Self {
        Self { max_delay_secs }
    }

    /// Delay after the `attempts`-th unsuccessful round: `min(2^attempts, max)` seconds
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let secs = 2u64.checked_pow(attempts).unwrap_or(u64::MAX);
        Duration::from_secs(secs.min(self.max_delay_secs))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DELAY_SECS)
    }
}

/// Suspends the poll loop between rounds
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
