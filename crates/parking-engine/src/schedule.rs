//! Classified day and week schedules.
//!
//! A [`DaySchedule`] is an ordered partition of `[00:00, 24:00)` into
//! [`Segment`]s. Construction goes through [`DaySchedule::from_segments`],
//! which checks the partition invariant, so a schedule that exists is always
//! gapless and non-overlapping.

use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::clock::{Interval, TimePoint};
use crate::days::{day_key, WEEK};
use crate::error::{EngineError, Result};
use crate::options::EndOfDay;

/// What a driver may do during a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentKind {
    Free,
    Paid,
    #[serde(rename = "No parking")]
    Restricted,
}

impl SegmentKind {
    /// Label used in rendered output.
    pub fn label(self) -> &'static str {
        match self {
            SegmentKind::Free => "Free",
            SegmentKind::Paid => "Paid",
            SegmentKind::Restricted => "No parking",
        }
    }
}

/// One classified stretch of a day. `fee` is set exactly when the segment is
/// paid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub from: TimePoint,
    pub to: TimePoint,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
}

impl Segment {
    pub fn interval(&self) -> Option<Interval> {
        Interval::new(self.from, self.to)
    }

    fn same_class(&self, other: &Segment) -> bool {
        self.kind == other.kind && self.fee == other.fee
    }
}

/// A full day, `00:00` to `24:00`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DaySchedule {
    segments: Vec<Segment>,
}

impl DaySchedule {
    /// One free segment covering the whole day.
    pub fn all_free() -> Self {
        DaySchedule {
            segments: vec![Segment {
                from: TimePoint::MIDNIGHT,
                to: TimePoint::END_OF_DAY,
                kind: SegmentKind::Free,
                fee: None,
            }],
        }
    }

    /// Coalesce adjacent segments of the same class, then check the
    /// partition invariant for `day`.
    pub fn from_segments(day: Weekday, segments: Vec<Segment>) -> Result<Self> {
        let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
        for segment in segments {
            if let Some(last) = merged.last_mut() {
                if last.to == segment.from && last.same_class(&segment) {
                    last.to = segment.to;
                    continue;
                }
            }
            merged.push(segment);
        }
        let schedule = DaySchedule { segments: merged };
        schedule.validate(day)?;
        Ok(schedule)
    }

    /// Check that the segments tile `[00:00, 24:00)` exactly and that fees
    /// appear only on paid segments.
    pub fn validate(&self, day: Weekday) -> Result<()> {
        let fail = |detail: String| EngineError::InternalConsistency {
            day: day_key(day),
            detail,
        };
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return Err(fail("no segments".to_string()));
        };
        if first.from != TimePoint::MIDNIGHT {
            return Err(fail(format!("day starts at {}", first.from)));
        }
        if last.to != TimePoint::END_OF_DAY {
            return Err(fail(format!("day ends at {}", last.to)));
        }
        for segment in &self.segments {
            if segment.from >= segment.to {
                return Err(fail(format!("empty segment {}-{}", segment.from, segment.to)));
            }
            let fee_ok = match segment.kind {
                SegmentKind::Paid => segment.fee.is_some_and(|f| f > 0.0),
                _ => segment.fee.is_none(),
            };
            if !fee_ok {
                return Err(fail(format!("bad fee on {}-{}", segment.from, segment.to)));
            }
        }
        for pair in self.segments.windows(2) {
            if pair[0].to != pair[1].from {
                return Err(fail(format!(
                    "gap or overlap between {} and {}",
                    pair[0].to, pair[1].from
                )));
            }
        }
        Ok(())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment in force at `point`.
    pub fn segment_at(&self, point: TimePoint) -> Option<&Segment> {
        self.segments.iter().find(|s| s.from <= point && point < s.to)
    }

    pub fn kind_at(&self, point: TimePoint) -> Option<SegmentKind> {
        self.segment_at(point).map(|s| s.kind)
    }

    pub fn is_all_free(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].kind == SegmentKind::Free
    }

    /// Render as the JSON list stored in a per-day output column.
    pub fn to_json(&self, end_of_day: EndOfDay) -> Value {
        let items = self
            .segments
            .iter()
            .map(|s| {
                let to = if s.to.is_end_of_day() {
                    end_of_day.label().to_string()
                } else {
                    s.to.to_string()
                };
                let mut item = json!({
                    "from": s.from.to_string(),
                    "to": to,
                    "type": s.kind.label(),
                });
                if let Some(fee) = s.fee {
                    item["fee"] = json!(fee);
                }
                item
            })
            .collect();
        Value::Array(items)
    }
}

/// Seven day schedules, Monday first.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSchedule {
    days: [DaySchedule; 7],
}

impl WeekSchedule {
    pub fn new(days: [DaySchedule; 7]) -> Self {
        WeekSchedule { days }
    }

    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day.num_days_from_monday() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        WEEK.into_iter().zip(self.days.iter())
    }

    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(|(day, schedule)| schedule.validate(day))
    }
}

impl Serialize for WeekSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (day, schedule) in self.iter() {
            map.serialize_entry(day_key(day), schedule)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(from: u16, to: u16, kind: SegmentKind, fee: Option<f64>) -> Segment {
        Segment {
            from: TimePoint::from_minutes(from).unwrap(),
            to: TimePoint::from_minutes(to).unwrap(),
            kind,
            fee,
        }
    }

    #[test]
    fn adjacent_equal_segments_coalesce() {
        let schedule = DaySchedule::from_segments(
            Weekday::Mon,
            vec![
                seg(0, 420, SegmentKind::Free, None),
                seg(420, 660, SegmentKind::Restricted, None),
                seg(660, 840, SegmentKind::Restricted, None),
                seg(840, 1440, SegmentKind::Free, None),
            ],
        )
        .unwrap();
        assert_eq!(schedule.segments().len(), 3);
        assert_eq!(schedule.segments()[1].to.to_string(), "14:00");
    }

    #[test]
    fn gap_is_an_internal_error() {
        let err = DaySchedule::from_segments(
            Weekday::Tue,
            vec![seg(0, 420, SegmentKind::Free, None), seg(480, 1440, SegmentKind::Free, None)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InternalConsistency { day: "TUE", .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn paid_segment_requires_positive_fee() {
        let err = DaySchedule::from_segments(Weekday::Wed, vec![seg(0, 1440, SegmentKind::Paid, Some(0.0))]);
        assert!(err.is_err());
    }

    #[test]
    fn renders_last_minute_end() {
        let json = DaySchedule::all_free().to_json(EndOfDay::LastMinute);
        assert_eq!(json.to_string(), r#"[{"from":"00:00","to":"23:59","type":"Free"}]"#);
    }

    #[test]
    fn serializes_with_type_key_and_optional_fee() {
        let schedule = DaySchedule::from_segments(
            Weekday::Mon,
            vec![seg(0, 540, SegmentKind::Free, None), seg(540, 1440, SegmentKind::Paid, Some(6.15))],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_string(&schedule).unwrap(),
            r#"[{"from":"00:00","to":"09:00","type":"Free"},{"from":"09:00","to":"24:00","type":"Paid","fee":6.15}]"#
        );
    }
}
