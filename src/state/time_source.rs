//! Wall-clock access and absolute end-timestamp arithmetic
//!
//! Remaining time is always derived from an absolute period end, never by
//! counting ticks, so late or skipped polls cannot accumulate drift.

use chrono::Utc;

/// Source of wall-clock time in epoch milliseconds
pub trait TimeSource: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// End timestamp of a period that starts now with `remaining_seconds` left
pub fn period_end(now_millis: i64, remaining_seconds: u64) -> i64 {
    now_millis.saturating_add(seconds_to_millis(remaining_seconds))
}

/// Whole seconds left until `end_millis`, halves rounded up, never negative
pub fn remaining_seconds(end_millis: i64, now_millis: i64) -> u64 {
    let left = end_millis.saturating_sub(now_millis);
    if left <= 0 {
        return 0;
    }
    ((left as u64) + 500) / 1000
}

pub fn seconds_to_millis(seconds: u64) -> i64 {
    i64::try_from(seconds.saturating_mul(1000)).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_rounds_to_nearest_second() {
        assert_eq!(remaining_seconds(10_000, 0), 10);
        assert_eq!(remaining_seconds(10_000, 400), 10);
        assert_eq!(remaining_seconds(10_000, 500), 10);
        assert_eq!(remaining_seconds(10_000, 501), 9);
        assert_eq!(remaining_seconds(10_000, 9_501), 0);
    }

    #[test]
    fn test_remaining_never_negative() {
        assert_eq!(remaining_seconds(10_000, 10_000), 0);
        assert_eq!(remaining_seconds(10_000, 700_000), 0);
    }

    #[test]
    fn test_single_late_poll_sees_the_whole_gap() {
        let end = period_end(1_000, 600);
        // one poll ten minutes later, no intermediate ticks
        assert_eq!(remaining_seconds(end, 1_000 + 599_000), 1);
        assert_eq!(remaining_seconds(end, 1_000 + 600_000), 0);
    }

    #[test]
    fn test_period_end() {
        assert_eq!(period_end(5_000, 25), 30_000);
        assert_eq!(period_end(5_000, 0), 5_000);
    }
}
