//! Injectable time capability.
//!
//! The retry loop and the polling engine suspend by sleeping; both take
//! their clock and their sleep through [`TimeSource`] so tests can observe
//! delays and advance a fake clock without real waiting.

use std::time::{Duration, Instant};

/// Monotonic clock plus a blocking sleep.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Production time source: `Instant::now` and `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
