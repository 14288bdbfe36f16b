//! Fixed-point wire time types: a 100ns-tick `DateTime`, its `TimeSpan`
//! difference type, and the closed-closed `TimeInterval` used by replay
//! descriptors and window operators.

use std::ops::{Add, Sub};

/// A count of 100ns ticks since a fixed epoch (Jan 1, year 1 UTC).
///
/// Matches the on-wire `Envelope` field layout exactly: `i64` ticks, no
/// timezone, no calendar math beyond addition/subtraction of `TimeSpan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(pub i64);

impl DateTime {
    pub const MIN: DateTime = DateTime(i64::MIN);
    pub const MAX: DateTime = DateTime(i64::MAX);

    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        DateTime(ticks)
    }

    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }
}

impl Add<TimeSpan> for DateTime {
    type Output = DateTime;
    fn add(self, rhs: TimeSpan) -> DateTime {
        DateTime(self.0 + rhs.0)
    }
}

impl Sub<TimeSpan> for DateTime {
    type Output = DateTime;
    fn sub(self, rhs: TimeSpan) -> DateTime {
        DateTime(self.0 - rhs.0)
    }
}

impl Sub<DateTime> for DateTime {
    type Output = TimeSpan;
    fn sub(self, rhs: DateTime) -> TimeSpan {
        TimeSpan(self.0 - rhs.0)
    }
}

/// A signed difference between two `DateTime` values, in 100ns ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan(pub i64);

impl TimeSpan {
    pub const ZERO: TimeSpan = TimeSpan(0);

    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        TimeSpan(ticks)
    }

    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        TimeSpan(ms * 10_000)
    }

    #[must_use]
    pub const fn ticks(self) -> i64 {
        self.0
    }
}

/// One endpoint of a `RelativeTimeInterval`: an offset plus whether it is
/// inclusive of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeBound {
    pub offset: TimeSpan,
    pub inclusive: bool,
}

impl RelativeBound {
    #[must_use]
    pub const fn inclusive(offset: TimeSpan) -> Self {
        RelativeBound {
            offset,
            inclusive: true,
        }
    }

    #[must_use]
    pub const fn exclusive(offset: TimeSpan) -> Self {
        RelativeBound {
            offset,
            inclusive: false,
        }
    }
}

/// A time interval relative to an anchor, as used by `RelativeTimeWindow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeTimeInterval {
    pub left: RelativeBound,
    pub right: RelativeBound,
}

impl RelativeTimeInterval {
    #[must_use]
    pub const fn new(left: RelativeBound, right: RelativeBound) -> Self {
        RelativeTimeInterval { left, right }
    }

    /// Resolve against an anchor time into an absolute `TimeInterval`.
    ///
    /// The resolved interval is always closed-closed; exclusivity at the
    /// relative bounds is approximated by nudging a single tick inward,
    /// which is exact for the 100ns tick granularity this type operates at.
    #[must_use]
    pub fn resolve(self, anchor: DateTime) -> TimeInterval {
        let mut left = anchor + self.left.offset;
        if !self.left.inclusive {
            left = left + TimeSpan(1);
        }
        let mut right = anchor + self.right.offset;
        if !self.right.inclusive {
            right = right - TimeSpan(1);
        }
        TimeInterval::new(left, right)
    }
}

/// A closed-closed `[left, right]` interval over `DateTime`, with sentinel
/// `MinValue`/`MaxValue` endpoints for unbounded intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub left: DateTime,
    pub right: DateTime,
}

impl TimeInterval {
    pub const INFINITE: TimeInterval = TimeInterval {
        left: DateTime::MIN,
        right: DateTime::MAX,
    };

    #[must_use]
    pub const fn new(left: DateTime, right: DateTime) -> Self {
        TimeInterval { left, right }
    }

    #[must_use]
    pub fn contains(&self, t: DateTime) -> bool {
        self.left <= t && t <= self.right
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left > self.right
    }

    /// The intersection of two intervals. Returns an empty interval (not
    /// `None`) when they do not overlap, so callers can chain `is_empty`.
    #[must_use]
    pub fn intersect(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            left: self.left.max(other.left),
            right: self.right.min(other.right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_round_trip() {
        let t = DateTime::from_ticks(1_000);
        let span = TimeSpan::from_ticks(250);
        assert_eq!((t + span) - span, t);
        assert_eq!((t + span) - t, span);
    }

    #[test]
    fn interval_intersect() {
        let a = TimeInterval::new(DateTime(0), DateTime(100));
        let b = TimeInterval::new(DateTime(50), DateTime(150));
        let i = a.intersect(&b);
        assert_eq!(i.left, DateTime(50));
        assert_eq!(i.right, DateTime(100));
        assert!(!i.is_empty());
    }

    #[test]
    fn interval_intersect_empty() {
        let a = TimeInterval::new(DateTime(0), DateTime(10));
        let b = TimeInterval::new(DateTime(20), DateTime(30));
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn relative_interval_resolve_exclusive() {
        let anchor = DateTime::from_ticks(1_000);
        let rel = RelativeTimeInterval::new(
            RelativeBound::exclusive(TimeSpan::from_ticks(-100)),
            RelativeBound::inclusive(TimeSpan::ZERO),
        );
        let resolved = rel.resolve(anchor);
        assert_eq!(resolved.left, DateTime::from_ticks(901));
        assert_eq!(resolved.right, anchor);
    }
}
