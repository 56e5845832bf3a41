//! Property-based tests for schedule resolution using proptest.
//!
//! These tests verify invariants that should hold for *any* record built from
//! the known vocabulary, not just the worked examples in `scenario_tests.rs`.

use chrono::Weekday;
use parking_engine::days::WEEK;
use parking_engine::{resolve_record, resolve_restrictions, MeterRecord, SegmentKind, TimePoint};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies — generate record columns
// ---------------------------------------------------------------------------

/// Render a minute of the day as a 12-hour clock reading (`7AM`, `4:30PM`).
fn twelve_hour(minutes: u16) -> String {
    let hour = (minutes / 60) % 24;
    let minute = minutes % 60;
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let dial = match hour % 12 {
        0 => 12,
        h => h,
    };
    if minute == 0 {
        format!("{dial}{meridiem}")
    } else {
        format!("{dial}:{minute:02}{meridiem}")
    }
}

/// A forward range on a 15-minute grid, as `(start, end, text)`.
fn arb_range() -> impl Strategy<Value = (u16, u16, String)> {
    (0u16..95)
        .prop_flat_map(|start| (Just(start), (start + 1)..=96))
        .prop_map(|(s, e)| {
            let (start, end) = (s * 15, e * 15);
            (start, end, format!("{}-{}", twelve_hour(start), twelve_hour(end)))
        })
}

fn arb_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("CLEARWAY"),
        Just("C/W"),
        Just("C/WAY"),
        Just("LZ"),
        Just("LOADING ZONE"),
        Just("BZ"),
        Just("BUS ZONE"),
        Just("NO STOPPING"),
        Just("TAXI ZONE"),
        Just("PASSENGER LOADING ZONE"),
        Just("M/C PARKING ONLY"),
        Just("JAZZ CLUB"),
        Just("TOWAWAY"),
    ]
}

fn arb_days() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("MON-FRI"),
        Just("M-F"),
        Just("S-S"),
        Just("MON-SAT"),
        Just("SAT,SUN"),
        Just("7 DAYS"),
        Just("(MON-FRI)"),
    ]
}

fn arb_operational_day() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("MON-FRI"),
        Just("7 DAYS"),
        Just("6 DAYS"),
        Just("5 DAYS"),
        Just("SAT-SUN"),
        Just("7"),
        Just(""),
    ]
}

fn arb_rate() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("0".to_string()),
        (1u32..2000).prop_map(|cents| format!("{}.{:02}", cents / 100, cents % 100)),
    ]
}

/// One restriction clause such as `LZ 7AM-9AM,4PM-6PM MON-FRI`.
fn arb_clause() -> impl Strategy<Value = String> {
    (arb_kind(), prop::collection::vec(arb_range(), 1..3), arb_days()).prop_map(|(kind, ranges, days)| {
        let times: Vec<String> = ranges.into_iter().map(|(_, _, text)| text).collect();
        format!("{} {} {}", kind, times.join(","), days)
    })
}

fn arb_restrictions() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("TAXI ZONE ALL OTHER TIMES".to_string()),
        prop::collection::vec(arb_clause(), 1..4).prop_map(|clauses| clauses.join(" & ")),
    ]
}

fn arb_record() -> impl Strategy<Value = MeterRecord> {
    (
        arb_restrictions(),
        arb_operational_day(),
        prop::collection::vec(arb_range(), 0..3),
        arb_rate(),
        arb_rate(),
    )
        .prop_map(|(restrictions, day, ranges, weekday, weekend)| {
            let times: Vec<String> = ranges.into_iter().map(|(_, _, text)| text).collect();
            MeterRecord {
                meter_no: None,
                restrictions: Some(restrictions),
                operational_day: Some(day.to_string()),
                operational_time: Some(times.join(",")),
                tar_rate_weekday: Some(weekday),
                tar_rate_ah_we: Some(weekend),
            }
        })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn minute(m: u16) -> TimePoint {
    TimePoint::from_minutes(m).unwrap()
}

// ---------------------------------------------------------------------------
// Property 1: Every day is a gapless partition of 00:00-24:00
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn every_day_covers_whole_day(record in arb_record()) {
        let week = resolve_record(&record).unwrap();
        for (_, day) in week.iter() {
            let segments = day.segments();
            prop_assert_eq!(segments.first().unwrap().from, TimePoint::MIDNIGHT);
            prop_assert_eq!(segments.last().unwrap().to, TimePoint::END_OF_DAY);
            for pair in segments.windows(2) {
                prop_assert_eq!(pair[0].to, pair[1].from);
            }
            for s in segments {
                prop_assert!(s.from < s.to);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Restriction beats a paid window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn restriction_wins_over_paid(
        (r_start, r_end, r_text) in arb_range(),
        (_, _, op_text) in arb_range(),
    ) {
        let record = MeterRecord {
            restrictions: Some(format!("CLEARWAY {r_text} MON-FRI")),
            operational_day: Some("7 DAYS".into()),
            operational_time: Some(op_text),
            tar_rate_weekday: Some("5.00".into()),
            tar_rate_ah_we: Some("5.00".into()),
            ..MeterRecord::default()
        };
        let week = resolve_record(&record).unwrap();
        let monday = week.day(Weekday::Mon);
        for m in [r_start, (r_start + r_end) / 2, r_end - 1] {
            prop_assert_eq!(monday.kind_at(minute(m)), Some(SegmentKind::Restricted));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Weekday-only operation leaves an unrestricted weekend free
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn weekday_operation_frees_weekend(
        day in prop_oneof![Just("MON-FRI"), Just("5 DAYS")],
        kind in arb_kind(),
        (_, _, r_text) in arb_range(),
        ranges in prop::collection::vec(arb_range(), 1..3),
        weekend_qualifier in any::<bool>(),
        rate in arb_rate(),
    ) {
        let mut times: Vec<String> = ranges.into_iter().map(|(_, _, text)| text).collect();
        if weekend_qualifier {
            times[0].push_str("(SAT,SUN)");
        }
        let record = MeterRecord {
            restrictions: Some(format!("{kind} {r_text} M-F")),
            operational_day: Some(day.to_string()),
            operational_time: Some(times.join(",")),
            tar_rate_weekday: Some(rate.clone()),
            tar_rate_ah_we: Some(rate),
            ..MeterRecord::default()
        };
        let week = resolve_record(&record).unwrap();
        for weekend_day in [Weekday::Sat, Weekday::Sun] {
            prop_assert!(week.day(weekend_day).is_all_free());
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Paid always has a positive fee; zero rates never charge
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn paid_segments_have_positive_fee(record in arb_record()) {
        let week = resolve_record(&record).unwrap();
        for (_, day) in week.iter() {
            for s in day.segments() {
                match s.kind {
                    SegmentKind::Paid => prop_assert!(s.fee.is_some_and(|f| f > 0.0)),
                    _ => prop_assert!(s.fee.is_none()),
                }
            }
        }
    }

    #[test]
    fn zero_rates_never_charge(
        mut record in arb_record(),
        zero in prop_oneof![Just(""), Just("0"), Just("0.00")],
    ) {
        record.tar_rate_weekday = Some(zero.to_string());
        record.tar_rate_ah_we = Some(zero.to_string());
        let week = resolve_record(&record).unwrap();
        for day in WEEK {
            prop_assert!(week.day(day).segments().iter().all(|s| s.kind != SegmentKind::Paid));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Clearway abbreviations resolve identically
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn clearway_abbreviations_round_trip(
        ranges in prop::collection::vec(arb_range(), 1..4),
        days in arb_days(),
    ) {
        let times: Vec<String> = ranges.into_iter().map(|(_, _, text)| text).collect();
        let tail = format!("{} {} TOWAWAY", times.join(","), days);
        let full = resolve_restrictions(&format!("CLEARWAY {tail}")).unwrap();
        let short = resolve_restrictions(&format!("C/W {tail}")).unwrap();
        let way = resolve_restrictions(&format!("C/WAY {tail}")).unwrap();
        prop_assert_eq!(&full, &short);
        prop_assert_eq!(&full, &way);
    }
}
