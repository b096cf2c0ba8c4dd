//! Wall-clock source for todo timestamps.
//!
//! Kept behind a trait so tests can pin or step time deterministically.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Provides the current time as Unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_epoch_ms(&self) -> i64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        // A clock set before the epoch reads as 0; the store clamps
        // timestamps forward anyway.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and deterministic demos.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_epoch_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_epoch_ms),
        }
    }

    /// Moves time to an absolute value (may go backwards).
    pub fn set(&self, epoch_ms: i64) {
        self.now.store(epoch_ms, Ordering::SeqCst);
    }

    /// Advances time by `delta_ms`.
    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_epoch_ms() > 1_577_836_800_000);
    }

    #[test]
    fn manual_clock_advances_and_sets() {
        let clock = ManualClock::new(100);
        clock.advance(5);
        assert_eq!(clock.now_epoch_ms(), 105);
        clock.set(50);
        assert_eq!(clock.now_epoch_ms(), 50);
    }
}
