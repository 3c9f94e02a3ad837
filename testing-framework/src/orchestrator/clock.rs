// File: testing-framework/src/orchestrator/clock.rs
//
// Clock Abstraction
//
// The simulated node stamps blocks with the time read from a Clock, so tests
// can pin wall-clock time and get fully reproducible block timestamps.

use evmctl_common::time::{get_current_time_in_seconds, TimestampSeconds};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of wall-clock time for the simulated node
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use evmctl_testing_framework::orchestrator::{Clock, ManualClock};
///
/// let clock = Arc::new(ManualClock::new(1_700_000_000));
/// clock.advance(60);
/// assert_eq!(clock.unix_time(), 1_700_000_060);
/// ```
pub trait Clock: Send + Sync {
    /// Current unix time in seconds
    fn unix_time(&self) -> TimestampSeconds;
}

/// System real-time clock
///
/// Block timestamps follow the host clock, like a development node started
/// from the command line.
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_time(&self) -> TimestampSeconds {
        get_current_time_in_seconds()
    }
}

/// Clock that only moves when told to
///
/// Every read returns the same value until `advance()` or `set()` is called,
/// which makes block timestamps a pure function of the operations a test
/// performs.
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: TimestampSeconds) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Start from the current system time
    pub fn starting_now() -> Self {
        Self::new(get_current_time_in_seconds())
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Jump to `timestamp`, backwards jumps included
    pub fn set(&self, timestamp: TimestampSeconds) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_now()
    }
}

impl Clock for ManualClock {
    fn unix_time(&self) -> TimestampSeconds {
        self.now.load(Ordering::SeqCst)
    }
}
