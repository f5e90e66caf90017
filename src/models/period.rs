//! Settlement period representation
//!
//! The "current period" is the active calendar month, evaluated at call
//! time. Callers must never cache a period across an operation boundary
//! or status queries go stale at month rollover.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open time range `[start, end)` used for status derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Period {
    /// Create a period from explicit bounds
    ///
    /// The boundary policy is pluggable through this constructor; the
    /// rest of the crate only ever asks `contains`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The calendar month containing the given instant
    pub fn month_of(at: DateTime<Utc>) -> Self {
        // Midnight on day 1 in UTC is always a single valid instant.
        let start = Utc
            .with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
            .unwrap();
        let (next_year, next_month) = if at.month() == 12 {
            (at.year() + 1, 1)
        } else {
            (at.year(), at.month() + 1)
        };
        let end = Utc
            .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
            .unwrap();
        Self { start, end }
    }

    /// The calendar month containing now, evaluated at call time
    pub fn current_month() -> Self {
        Self::month_of(Utc::now())
    }

    /// Start bound (inclusive)
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End bound (exclusive)
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Check if an instant falls within this period
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_month_bounds() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let period = Period::month_of(at);

        assert_eq!(period.start(), Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end(), Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
        assert!(period.contains(at));
    }

    #[test]
    fn test_december_rolls_into_january() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let period = Period::month_of(at);

        assert_eq!(period.end(), Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(period.contains(at));
    }

    #[test]
    fn test_half_open_bounds() {
        let at = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let period = Period::month_of(at);

        assert!(period.contains(period.start()));
        assert!(!period.contains(period.end()));
        assert!(!period.contains(period.start() - Duration::seconds(1)));
    }

    #[test]
    fn test_current_month_contains_now() {
        let period = Period::current_month();
        assert!(period.contains(Utc::now()));
    }

    #[test]
    fn test_display() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(format!("{}", Period::month_of(at)), "2025-03");
    }
}
