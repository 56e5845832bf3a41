//! Record processor: one meter record in, one week schedule (or a failure
//! marker) out.
//!
//! Records are independent, so a batch is resolved on the rayon pool with no
//! shared state. Input errors in one record never affect another: they are
//! logged and turned into a failed [`ProcessedRecord`]. Internal consistency
//! errors are defects and abort the batch unless
//! [`EngineOptions::skip_inconsistent`] is set.

use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};

use crate::compositor::compose_week;
use crate::days::{day_key, WEEK};
use crate::error::{EngineError, Result};
use crate::operational::resolve_operational;
use crate::options::{EndOfDay, EngineOptions};
use crate::restriction::resolve_restrictions;
use crate::schedule::WeekSchedule;

/// One row of the parking meter dataset. Every column is optional and may be
/// given as text or as a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MeterRecord {
    #[serde(default, deserialize_with = "lenient_text::deserialize")]
    pub meter_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_text::deserialize")]
    pub restrictions: Option<String>,
    #[serde(default, deserialize_with = "lenient_text::deserialize")]
    pub operational_day: Option<String>,
    #[serde(default, deserialize_with = "lenient_text::deserialize")]
    pub operational_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text::deserialize")]
    pub tar_rate_weekday: Option<String>,
    #[serde(default, deserialize_with = "lenient_text::deserialize")]
    pub tar_rate_ah_we: Option<String>,
}

mod lenient_text {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(serde::de::Error::custom(format!(
                "expected text or a number, found {other}"
            ))),
        }
    }
}

/// Column text, with spreadsheet `nan` placeholders read as empty.
fn text(column: &Option<String>) -> &str {
    match column.as_deref().map(str::trim) {
        Some(t) if t.eq_ignore_ascii_case("nan") => "",
        Some(t) => t,
        None => "",
    }
}

/// The outcome for one record.
///
/// A failed record has `schedule: None` and carries its error, which keeps it
/// distinct from a record that is legitimately free all week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRecord {
    pub meter_no: Option<String>,
    pub schedule: Option<WeekSchedule>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_message")]
    pub error: Option<EngineError>,
}

fn error_message<S: Serializer>(error: &Option<EngineError>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.collect_str(e),
        None => s.serialize_none(),
    }
}

impl ProcessedRecord {
    pub fn is_failed(&self) -> bool {
        self.schedule.is_none()
    }

    /// Flatten into the output columns `MON_PARKING` .. `SUN_PARKING` plus
    /// `PARSE_ERROR`. Failed records get empty day columns.
    pub fn columns(&self, end_of_day: EndOfDay) -> Vec<(String, String)> {
        let mut columns: Vec<(String, String)> = WEEK
            .iter()
            .map(|&day| {
                let value = self
                    .schedule
                    .as_ref()
                    .map(|s| s.day(day).to_json(end_of_day).to_string())
                    .unwrap_or_default();
                (format!("{}_PARKING", day_key(day)), value)
            })
            .collect();
        let error = self.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
        columns.push(("PARSE_ERROR".to_string(), error));
        columns
    }
}

/// Resolve one record, surfacing every error.
pub fn resolve_record(record: &MeterRecord) -> Result<WeekSchedule> {
    let restrictions = resolve_restrictions(text(&record.restrictions))?;
    let operations = resolve_operational(
        text(&record.operational_day),
        text(&record.operational_time),
        text(&record.tar_rate_weekday),
        text(&record.tar_rate_ah_we),
    )?;
    log::debug!(
        "meter {}: {} restriction clauses, {} operational clauses",
        text(&record.meter_no),
        restrictions.len(),
        operations.len()
    );
    compose_week(&restrictions, &operations)
}

/// Resolve one record, downgrading input errors to a failed record.
pub fn process_record(record: &MeterRecord, options: &EngineOptions) -> Result<ProcessedRecord> {
    settle(record, resolve_record(record), options)
}

/// Turn a resolution outcome into a [`ProcessedRecord`], propagating only
/// the errors `options` does not allow to be skipped.
fn settle(record: &MeterRecord, outcome: Result<WeekSchedule>, options: &EngineOptions) -> Result<ProcessedRecord> {
    let meter_no = record.meter_no.clone();
    match outcome {
        Ok(schedule) => Ok(ProcessedRecord {
            meter_no,
            schedule: Some(schedule),
            error: None,
        }),
        Err(err) if err.is_recoverable() || options.skip_inconsistent => {
            if err.is_recoverable() {
                log::warn!("meter {}: {}", text(&record.meter_no), err);
            } else {
                log::error!("meter {}: skipping after {}", text(&record.meter_no), err);
            }
            Ok(ProcessedRecord {
                meter_no,
                schedule: None,
                error: Some(err),
            })
        }
        Err(err) => Err(err),
    }
}

/// Resolve a batch, preserving input order.
pub fn process_batch(records: &[MeterRecord], options: &EngineOptions) -> Result<Vec<ProcessedRecord>> {
    let processed: Vec<ProcessedRecord> = if options.parallel {
        records
            .par_iter()
            .map(|r| process_record(r, options))
            .collect::<Result<_>>()?
    } else {
        records
            .iter()
            .map(|r| process_record(r, options))
            .collect::<Result<_>>()?
    };
    let failed = processed.iter().filter(|p| p.is_failed()).count();
    log::info!("processed {} meter records, {} failed", processed.len(), failed);
    Ok(processed)
}
