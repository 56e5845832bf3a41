//! Days of the week and sets of days.
//!
//! A [`DaySet`] is a seven-bit mask indexed Monday-first, so expanding
//! ranges, lists and codes (`MON-FRI`, `SAT,SUN`, `7 DAYS`, `M-F`, `S-S`)
//! all reduce to cheap bit operations.

use std::fmt;

use chrono::Weekday;
use serde::{Serialize, Serializer};

/// The week in output order, Monday first.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Three-letter upper-case key used in schedule output (`MON` .. `SUN`).
pub fn day_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

/// A set of weekdays.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);
    pub const ALL: DaySet = DaySet(0b111_1111);
    /// Monday to Friday.
    pub const WEEKDAYS: DaySet = DaySet(0b001_1111);
    /// Saturday and Sunday.
    pub const WEEKEND: DaySet = DaySet(0b110_0000);
    /// Monday to Saturday (`6 DAYS`).
    pub const MON_SAT: DaySet = DaySet(0b011_1111);

    pub fn single(day: Weekday) -> Self {
        DaySet(1 << day.num_days_from_monday())
    }

    /// Inclusive range walking forward from `from` to `to`, wrapping past
    /// Sunday when `to` comes before `from` (`FRI-MON`).
    pub fn range(from: Weekday, to: Weekday) -> Self {
        let mut set = DaySet::EMPTY;
        let mut day = from;
        loop {
            set = set.with(day);
            if day == to {
                return set;
            }
            day = day.succ();
        }
    }

    pub fn with(self, day: Weekday) -> Self {
        self.union(DaySet::single(day))
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & DaySet::single(day).0 != 0
    }

    pub fn union(self, other: DaySet) -> Self {
        DaySet(self.0 | other.0)
    }

    pub fn intersection(self, other: DaySet) -> Self {
        DaySet(self.0 & other.0)
    }

    pub fn difference(self, other: DaySet) -> Self {
        DaySet(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_subset(self, other: DaySet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Every day moved one day later; Sunday wraps to Monday. Used for the
    /// after-midnight half of an overnight range.
    pub fn next_days(self) -> Self {
        let rotated = (self.0 << 1) | (self.0 >> 6);
        DaySet(rotated & DaySet::ALL.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |d| self.contains(*d))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(DaySet::EMPTY, DaySet::with)
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.iter().map(day_key).collect();
        f.write_str(&keys.join(","))
    }
}

impl Serialize for DaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read a single day word (`MON`, `TUES`, `THURSDAY`, ...).
pub(crate) fn day_atom(word: &str) -> Option<Weekday> {
    let day = match word {
        "MON" | "MONDAY" => Weekday::Mon,
        "TUE" | "TUES" | "TUESDAY" => Weekday::Tue,
        "WED" | "WEDNESDAY" => Weekday::Wed,
        "THU" | "THUR" | "THURS" | "THURSDAY" => Weekday::Thu,
        "FRI" | "FRIDAY" => Weekday::Fri,
        "SAT" | "SATURDAY" => Weekday::Sat,
        "SUN" | "SUNDAY" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Day words that stand for a whole set on their own.
pub(crate) fn day_word(word: &str) -> Option<DaySet> {
    match word {
        "WEEKDAYS" => Some(DaySet::WEEKDAYS),
        "WEEKEND" | "WEEKENDS" => Some(DaySet::WEEKEND),
        "DAILY" => Some(DaySet::ALL),
        _ => day_atom(word).map(DaySet::single),
    }
}

/// Read a hyphenated day pair: the `M-F` / `S-S` codes or a range of two
/// day atoms.
pub(crate) fn day_pair(left: &str, right: &str) -> Option<DaySet> {
    match (left, right) {
        ("M", "F") => Some(DaySet::WEEKDAYS),
        ("S", "S") => Some(DaySet::WEEKEND),
        _ => Some(DaySet::range(day_atom(left)?, day_atom(right)?)),
    }
}

/// `N DAYS` codes.
pub(crate) fn day_count(count: u32) -> Option<DaySet> {
    match count {
        7 => Some(DaySet::ALL),
        6 => Some(DaySet::MON_SAT),
        5 => Some(DaySet::WEEKDAYS),
        _ => None,
    }
}
