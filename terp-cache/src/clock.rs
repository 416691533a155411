//! Time sources and the bucket formula.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time, in seconds since the Unix epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in (fractional) seconds.
    fn now(&self) -> f64;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        // A clock set before 1970 lands everything in bucket 0.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `secs`.
    pub fn new(secs: f64) -> Self {
        Self {
            secs: AtomicU64::new(secs.to_bits()),
        }
    }

    /// Moves the clock to `secs`.
    pub fn set(&self, secs: f64) {
        self.secs.store(secs.to_bits(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.set(self.now() + by.as_secs_f64());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.secs.load(Ordering::SeqCst))
    }
}

/// Index of the time bucket containing `now`: `floor(now / max_age)`.
///
/// `max_age` must be non-zero; [`crate::MemoConfig::validate`] enforces that
/// before any memoizer calls this.
pub fn bucket_index(now: f64, max_age: Duration) -> i64 {
    (now / max_age.as_secs_f64()).floor() as i64
}
