//! Time source used by the engine.
//!
//! Fade frames and orphan deadlines are computed from a [`Clock`] instead of
//! sleeping, so tests can drive simulated time.

use std::time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
