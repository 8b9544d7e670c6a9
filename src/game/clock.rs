//! Clock - Monotonic time source for strides and ticks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time since the clock's origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Real time, measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start measuring from now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same reading, so a test can keep a
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock reading zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the reading to `now`, saturating at `u64::MAX` nanoseconds
    pub fn set(&self, now: Duration) {
        self.nanos.store(saturating_nanos(now), Ordering::SeqCst);
    }

    /// Move the reading to `secs` seconds
    pub fn set_secs(&self, secs: f64) {
        self.set(Duration::from_secs_f64(secs));
    }

    /// Move the reading forward by `by`
    pub fn advance(&self, by: Duration) {
        let by = saturating_nanos(by);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(by)));
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
