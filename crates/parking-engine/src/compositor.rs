//! Timeline compositor: restriction and operational clauses → week schedule.
//!
//! Runs in two passes per day. First the absolute restrictions are collected
//! and any "ALL OTHER TIMES" restriction is resolved against the day's
//! operational windows. Then the day is cut at every interval boundary and
//! each slice is classified with precedence Restricted > Paid > Free.

use chrono::Weekday;

use crate::clock::{Interval, TimePoint};
use crate::days::WEEK;
use crate::error::Result;
use crate::operational::OperationalClause;
use crate::restriction::RestrictionClause;
use crate::schedule::{DaySchedule, Segment, SegmentKind, WeekSchedule};

/// Composite all seven days.
pub fn compose_week(
    restrictions: &[RestrictionClause],
    operations: &[OperationalClause],
) -> Result<WeekSchedule> {
    let mut days: [DaySchedule; 7] = std::array::from_fn(|_| DaySchedule::all_free());
    for (slot, day) in days.iter_mut().zip(WEEK) {
        *slot = compose_day(day, restrictions, operations)?;
    }
    Ok(WeekSchedule::new(days))
}

/// Composite a single day.
pub fn compose_day(
    day: Weekday,
    restrictions: &[RestrictionClause],
    operations: &[OperationalClause],
) -> Result<DaySchedule> {
    let windows: Vec<&OperationalClause> = operations.iter().filter(|c| c.days.contains(day)).collect();

    let mut blocked: Vec<Interval> = restrictions
        .iter()
        .filter(|r| !r.relative && r.days.contains(day))
        .filter_map(|r| r.interval)
        .collect();
    if restrictions.iter().any(|r| r.relative && r.days.contains(day)) {
        let open = merge_intervals(windows.iter().map(|w| w.interval).collect());
        blocked.extend(complement(&open));
    }
    let blocked = merge_intervals(blocked);

    let mut cuts = vec![TimePoint::MIDNIGHT, TimePoint::END_OF_DAY];
    cuts.extend(blocked.iter().flat_map(|i| [i.start, i.end]));
    cuts.extend(windows.iter().flat_map(|w| [w.interval.start, w.interval.end]));
    cuts.sort_unstable();
    cuts.dedup();

    let segments = cuts
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            if blocked.iter().any(|b| b.covers(from, to)) {
                return Segment {
                    from,
                    to,
                    kind: SegmentKind::Restricted,
                    fee: None,
                };
            }
            // Overlapping paid windows charge the higher rate.
            let fee = windows
                .iter()
                .filter(|w| w.is_paid() && w.interval.covers(from, to))
                .map(|w| w.rate)
                .fold(None, |best: Option<f64>, rate| Some(best.map_or(rate, |b| b.max(rate))));
            Segment {
                from,
                to,
                kind: if fee.is_some() { SegmentKind::Paid } else { SegmentKind::Free },
                fee,
            }
        })
        .collect();

    DaySchedule::from_segments(day, segments)
}

/// Sort and merge overlapping or touching intervals.
fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_unstable();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

/// The gaps in `[00:00, 24:00)` left by sorted, merged intervals.
fn complement(merged: &[Interval]) -> Vec<Interval> {
    let mut gaps = Vec::new();
    let mut cursor = TimePoint::MIDNIGHT;
    for interval in merged {
        if let Some(gap) = Interval::new(cursor, interval.start) {
            gaps.push(gap);
        }
        cursor = cursor.max(interval.end);
    }
    if let Some(gap) = Interval::new(cursor, TimePoint::END_OF_DAY) {
        gaps.push(gap);
    }
    gaps
}
