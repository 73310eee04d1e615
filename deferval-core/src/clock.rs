use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// Reference point for every `MonotonicClock` reading in the process.
static CLOCK_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Source of monotonic time for expiry arithmetic.
///
/// Readings are nanosecond ticks in a wrapping `u64` space. Consumers must
/// never compare two readings directly; they compare the signed difference
/// (see [`is_at_or_after`]) so that a counter rolling over `u64::MAX` keeps
/// ordering correctly.
pub trait Clock: Send + Sync {
    /// Current reading, in nanoseconds since an arbitrary fixed origin.
    fn now_ticks(&self) -> u64;
}

/// Default clock backed by [`Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now_ticks(&self) -> u64 {
        // Truncation is fine: the tick space is treated as wrapping.
        Instant::now().saturating_duration_since(*CLOCK_EPOCH).as_nanos() as u64
    }
}

/// Clock that only moves when told to.
///
/// Intended for tests that need exact control over expiry, including
/// readings close to the `u64` rollover.
///
/// # Examples
///
/// ```
/// use deferval_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new(0);
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.now_ticks(), 5_000_000);
///
/// clock.set(u64::MAX);
/// clock.advance(Duration::from_nanos(2));
/// assert_eq!(clock.now_ticks(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    ticks: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            ticks: AtomicU64::new(start),
        }
    }

    /// Moves the clock forward, wrapping past `u64::MAX`.
    pub fn advance(&self, by: Duration) {
        let by = duration_to_ticks(by);
        // fetch_add on atomics already wraps on overflow
        self.ticks.fetch_add(by, Ordering::SeqCst);
    }

    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

/// Converts a duration to ticks, clamped to `i64::MAX` so that any two
/// readings at most one lifetime apart still compare correctly through a
/// signed difference.
#[inline]
pub(crate) fn duration_to_ticks(duration: Duration) -> u64 {
    let nanos = duration.as_nanos();
    if nanos > i64::MAX as u128 {
        i64::MAX as u64
    } else {
        nanos as u64
    }
}

/// Returns `true` when `now` is at or past `deadline` in wrapping tick space.
#[inline]
pub(crate) fn is_at_or_after(now: u64, deadline: u64) -> bool {
    (now.wrapping_sub(deadline) as i64) >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let clock = MonotonicClock;
        let first = clock.now_ticks();
        std::thread::sleep(Duration::from_millis(2));
        let second = clock.now_ticks();
        assert!(is_at_or_after(second, first));
        assert!(second.wrapping_sub(first) >= 2_000_000);
    }

    #[test]
    fn test_is_at_or_after_plain() {
        assert!(is_at_or_after(10, 10));
        assert!(is_at_or_after(11, 10));
        assert!(!is_at_or_after(9, 10));
    }

    #[test]
    fn test_is_at_or_after_across_rollover() {
        let deadline = u64::MAX - 4;
        // 5 ticks later the counter has wrapped to 0
        assert!(is_at_or_after(0, deadline));
        assert!(is_at_or_after(100, deadline));
        assert!(!is_at_or_after(u64::MAX - 10, deadline));

        let wrapped_deadline = 5u64;
        assert!(!is_at_or_after(u64::MAX, wrapped_deadline));
        assert!(is_at_or_after(5, wrapped_deadline));
    }

    #[test]
    fn test_duration_to_ticks_clamps() {
        assert_eq!(duration_to_ticks(Duration::from_micros(3)), 3_000);
        assert_eq!(duration_to_ticks(Duration::MAX), i64::MAX as u64);
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ticks(), 100);
        clock.advance(Duration::from_nanos(50));
        assert_eq!(clock.now_ticks(), 150);
        clock.set(7);
        assert_eq!(clock.now_ticks(), 7);
    }
}
