//! Time sources for envelope expiry.
//!
//! Expiry is tracked as floating-point seconds since the Unix epoch so that
//! sub-second timeouts survive the round trip through the backend.

use std::sync::Mutex;
use std::time::Duration;

use jiff::Timestamp;

/// Source of the current time in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall clock backed by `jiff::Timestamp::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Timestamp::now().as_microsecond() as f64 / 1_000_000.0
    }
}

/// A clock that only moves when told to.
///
/// Lets callers and tests observe expiry without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    /// Start at the given epoch seconds.
    pub fn starting_at(seconds: f64) -> Self {
        Self {
            now: Mutex::new(seconds),
        }
    }

    /// Start at the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(SystemClock.now())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by.as_secs_f64();
    }

    pub fn set(&self, seconds: f64) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = seconds;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
