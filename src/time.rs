//! Time representation and an injectable clock: tests must be able to
//! control `now()` directly rather than racing the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Absolute point in time, nanoseconds since an arbitrary epoch.
///
/// Each unit has its own clock , so `Time` values are only meaningfully compared within
/// the scope of a single unit and its directly-wired collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u64);

impl Time {
    /// The zero instant
    pub const ZERO: Self = Self(0);

    /// Construct from a raw nanosecond count
    pub const fn from_nanos(ns: u64) -> Self {
        Self(ns)
    }

    /// Construct from a millisecond count
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000_000)
    }

    /// Nanoseconds since the clock's epoch
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Milliseconds since the clock's epoch, truncating sub-millisecond precision
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Duration since an earlier time, saturating at zero rather than underflowing
    pub fn saturating_since(&self, earlier: Time) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// This time advanced by a duration
    pub fn advance(&self, by: Duration) -> Self {
        Self(self.0.saturating_add(by.as_nanos()))
    }
}

/// A span of time, nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u64);

impl Duration {
    /// Zero-length duration
    pub const ZERO: Self = Self(0);

    /// Construct from nanoseconds
    pub const fn from_nanos(ns: u64) -> Self {
        Self(ns)
    }

    /// Construct from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000_000)
    }

    /// Nanoseconds in this duration
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// This duration expressed in fractional seconds, for rate calculations
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::from_nanos(d.0)
    }
}

/// A source of the current time, injectable so tests don't depend on wall-clock jitter.
pub trait Clock: Send + Sync {
    /// The current time according to this clock
    fn now(&self) -> Time;
}

/// Wall-clock time, measured as nanoseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        let ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Time::from_nanos(ns)
    }
}

/// A manually-advanced clock for deterministic tests. Drives time from an
/// explicit logical counter rather than the wall clock.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now_ns: Arc<AtomicU64>,
}

impl FakeClock {
    /// Create a fake clock starting at `Time::ZERO`
    pub fn new() -> Self {
        Self::at(Time::ZERO)
    }

    /// Create a fake clock starting at a given time
    pub fn at(start: Time) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(start.as_nanos())),
        }
    }

    /// Advance the clock by a duration
    pub fn advance(&self, by: Duration) {
        self.now_ns.fetch_add(by.as_nanos(), Ordering::SeqCst);
    }

    /// Set the clock to an absolute time
    pub fn set(&self, to: Time) {
        self.now_ns.store(to.as_nanos(), Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Time {
        Time::from_nanos(self.now_ns.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_construction() {
        let t = Time::from_millis(5);
        assert_eq!(t.as_nanos(), 5_000_000);
        assert_eq!(t.as_millis(), 5);
    }

    #[test]
    fn test_saturating_since_never_underflows() {
        let earlier = Time::from_millis(10);
        let later = Time::from_millis(3);
        assert_eq!(later.saturating_since(earlier), Duration::ZERO);

        let d = earlier.saturating_since(Time::from_millis(3));
        assert_eq!(d.as_nanos(), 7_000_000);
    }

    #[test]
    fn test_fake_clock_advances() {
        let clock = FakeClock::new();
        assert_eq!(clock.now(), Time::ZERO);

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now(), Time::from_millis(5));

        clock.set(Time::from_millis(100));
        assert_eq!(clock.now(), Time::from_millis(100));
    }

    #[test]
    fn test_fake_clock_shared_across_clones() {
        let clock = FakeClock::new();
        let clone = clock.clone();
        clock.advance(Duration::from_millis(1));
        assert_eq!(clone.now(), Time::from_millis(1));
    }
}
