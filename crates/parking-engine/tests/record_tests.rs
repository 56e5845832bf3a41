//! Tests for record I/O shapes: deserialization, serialization, columns and
//! options.

use chrono::Weekday;
use parking_engine::{
    process_record, resolve_record, EndOfDay, EngineOptions, MeterRecord, SegmentKind, TimePoint,
};
use serde_json::json;

fn clearway_record() -> MeterRecord {
    serde_json::from_value(json!({
        "METER_NO": 40512,
        "RESTRICTIONS": "CLEARWAY 7AM-9AM,4PM-7PM MON-FRI TOWAWAY",
        "OPERATIONAL_DAY": "MON-FRI",
        "OPERATIONAL_TIME": "9AM-16:00",
        "TAR_RATE_WEEKDAY": 6.15,
        "TAR_RATE_AH_WE": null
    }))
    .unwrap()
}

#[test]
fn record_accepts_numbers_and_missing_columns() {
    let record = clearway_record();
    assert_eq!(record.meter_no.as_deref(), Some("40512"));
    assert_eq!(record.tar_rate_weekday.as_deref(), Some("6.15"));
    assert_eq!(record.tar_rate_ah_we, None);

    let sparse: MeterRecord = serde_json::from_value(json!({ "METER_NO": "A1" })).unwrap();
    assert_eq!(sparse.restrictions, None);
}

#[test]
fn nan_placeholders_read_as_empty() {
    let record: MeterRecord = serde_json::from_value(json!({
        "RESTRICTIONS": "nan",
        "OPERATIONAL_DAY": "7 DAYS",
        "OPERATIONAL_TIME": "8AM-6PM",
        "TAR_RATE_WEEKDAY": "NaN",
        "TAR_RATE_AH_WE": "nan"
    }))
    .unwrap();
    let week = resolve_record(&record).unwrap();
    assert_eq!(
        week.day(Weekday::Mon).kind_at(TimePoint::from_hm(12, 0).unwrap()),
        Some(SegmentKind::Free)
    );
}

#[test]
fn week_serializes_keyed_by_day() {
    let week = resolve_record(&clearway_record()).unwrap();
    let value = serde_json::to_value(&week).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"]);
    assert_eq!(
        value["MON"][2],
        json!({ "from": "09:00", "to": "16:00", "type": "Paid", "fee": 6.15 })
    );
    assert_eq!(value["MON"][1]["type"], "No parking");
    assert_eq!(
        value["SAT"],
        json!([{ "from": "00:00", "to": "24:00", "type": "Free" }])
    );
}

#[test]
fn columns_flatten_one_per_day() {
    let processed = process_record(&clearway_record(), &EngineOptions::default()).unwrap();
    let columns = processed.columns(EndOfDay::LastMinute);
    let names: Vec<&str> = columns.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        names,
        [
            "MON_PARKING",
            "TUE_PARKING",
            "WED_PARKING",
            "THU_PARKING",
            "FRI_PARKING",
            "SAT_PARKING",
            "SUN_PARKING",
            "PARSE_ERROR"
        ]
    );
    assert_eq!(
        columns[5].1,
        r#"[{"from":"00:00","to":"23:59","type":"Free"}]"#
    );
    assert_eq!(columns[7].1, "");
}

#[test]
fn failed_record_serializes_null_schedule() {
    let record = MeterRecord {
        meter_no: Some("B7".into()),
        restrictions: Some("FOOBAR ZONE 5AM-6AM".into()),
        ..MeterRecord::default()
    };
    let processed = process_record(&record, &EngineOptions::default()).unwrap();
    let value = serde_json::to_value(&processed).unwrap();
    assert_eq!(value["meter_no"], "B7");
    assert!(value["schedule"].is_null());
    assert_eq!(value["error"], "Unrecognized token in RESTRICTIONS: 'FOOBAR'");

    let columns = processed.columns(EndOfDay::Midnight);
    assert!(columns[..7].iter().all(|(_, v)| v.is_empty()));
    assert_eq!(columns[7].1, "Unrecognized token in RESTRICTIONS: 'FOOBAR'");
}

#[test]
fn options_load_from_json_with_defaults() {
    let options = EngineOptions::from_json(r#"{ "end_of_day": "LastMinute" }"#).unwrap();
    assert_eq!(options.end_of_day, EndOfDay::LastMinute);
    assert!(options.parallel);
    assert!(!options.skip_inconsistent);

    assert_eq!(EngineOptions::from_json("{}").unwrap(), EngineOptions::default());
    assert!(EngineOptions::from_json(r#"{ "parallel": "yes" }"#).is_err());
}
