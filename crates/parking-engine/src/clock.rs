//! Minute-of-day arithmetic.
//!
//! Everything in the engine works on whole minutes within one day. The start
//! of the day is minute 0 (`00:00`) and the end-of-day boundary is minute
//! 1440 (`24:00`), kept distinct from `00:00` so that a day can be expressed
//! as the half-open interval `[00:00, 24:00)`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::days::DaySet;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A minute of the day in `0..=1440`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(u16);

impl TimePoint {
    pub const MIDNIGHT: TimePoint = TimePoint(0);
    pub const END_OF_DAY: TimePoint = TimePoint(MINUTES_PER_DAY);

    /// Build from a 24-hour clock reading. `24:00` is accepted as the
    /// end-of-day boundary; anything later is rejected.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if minute > 59 {
            return None;
        }
        let total = hour.checked_mul(60)?.checked_add(minute)?;
        (total <= MINUTES_PER_DAY).then_some(TimePoint(total))
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(TimePoint(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn is_end_of_day(self) -> bool {
        self.0 == MINUTES_PER_DAY
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl fmt::Debug for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for TimePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Half-open `[start, end)` span within one day. `start < end` always holds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Interval {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl Interval {
    pub const WHOLE_DAY: Interval = Interval {
        start: TimePoint::MIDNIGHT,
        end: TimePoint::END_OF_DAY,
    };

    /// `None` when the span would be empty or reversed.
    pub fn new(start: TimePoint, end: TimePoint) -> Option<Self> {
        (start < end).then_some(Interval { start, end })
    }

    pub fn contains(&self, point: TimePoint) -> bool {
        self.start <= point && point < self.end
    }

    /// True when `[from, to)` lies entirely inside this interval.
    pub fn covers(&self, from: TimePoint, to: TimePoint) -> bool {
        self.start <= from && to <= self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A parsed clock range as written, before it is pinned to days.
///
/// `end` may come before `start`, meaning the range runs past midnight.
/// Equal bounds never survive parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl TimeRange {
    pub const ALL_DAY: TimeRange = TimeRange {
        start: TimePoint::MIDNIGHT,
        end: TimePoint::END_OF_DAY,
    };

    pub fn is_overnight(&self) -> bool {
        self.end < self.start
    }

    /// Pin the range to `days`. An overnight range splits into
    /// `[start, 24:00)` on the named days and `[00:00, end)` on the day after
    /// each of them.
    pub fn windows(&self, days: DaySet) -> Vec<(DaySet, Interval)> {
        if let Some(interval) = Interval::new(self.start, self.end) {
            return vec![(days, interval)];
        }
        let mut out = Vec::with_capacity(2);
        if let Some(evening) = Interval::new(self.start, TimePoint::END_OF_DAY) {
            out.push((days, evening));
        }
        if let Some(morning) = Interval::new(TimePoint::MIDNIGHT, self.end) {
            out.push((days.next_days(), morning));
        }
        out
    }
}
