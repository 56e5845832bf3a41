//! Operational window resolver: when is the meter charging, and at what rate.
//!
//! Combines OPERATIONAL_DAY, OPERATIONAL_TIME and the two tariff columns into
//! [`OperationalClause`]s. Each clause lies entirely on weekdays or entirely
//! on the weekend so it carries exactly one rate.

use serde::Serialize;

use crate::clock::Interval;
use crate::days::DaySet;
use crate::error::{EngineError, Field, Result};
use crate::grammar::{parse_time_list, tokenize, Token};

/// A window during which the meter is operational.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalClause {
    pub days: DaySet,
    pub interval: Interval,
    /// Hourly tariff. Zero means the window is operational but free.
    pub rate: f64,
}

impl OperationalClause {
    pub fn is_paid(&self) -> bool {
        self.rate > 0.0
    }
}

/// Parse an OPERATIONAL_DAY value. `None` when the column is empty.
///
/// Accepts `MON-FRI`, `7 DAYS`, `6 DAYS`, `5 DAYS`, `SAT-SUN`, the bare
/// `7`, and any other day qualifier the grammar knows.
pub fn parse_operational_days(input: &str) -> Result<Option<DaySet>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed == "7" {
        return Ok(Some(DaySet::ALL));
    }
    let mut days = DaySet::EMPTY;
    for lexeme in tokenize(trimmed, Field::OperationalDay)? {
        match lexeme.token {
            Token::Days { days: d, .. } => days = days.union(d),
            Token::Comma | Token::Amp => {}
            Token::Word(word) => return Err(EngineError::unrecognized(Field::OperationalDay, word)),
            Token::Time(_) => {
                return Err(EngineError::parse(
                    Field::OperationalDay,
                    lexeme.text,
                    "expected days, found a time range",
                ))
            }
        }
    }
    if days.is_empty() {
        return Err(EngineError::parse(Field::OperationalDay, trimmed, "no days given"));
    }
    Ok(Some(days))
}

/// Parse a tariff column. Empty means no charge; a leading `$` is allowed.
pub fn parse_rate(input: &str, field: Field) -> Result<f64> {
    let text = input.trim().trim_start_matches('$').trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    let rate: f64 = text
        .parse()
        .map_err(|_| EngineError::parse(field, text, "rate is not a number"))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(EngineError::parse(field, text, "rate must be a non-negative amount"));
    }
    Ok(rate)
}

/// Resolve the operational columns of one record.
///
/// - A range's own day qualifier (`7PM-10PM(MON-FRI)`) replaces
///   OPERATIONAL_DAY for that range; other ranges use OPERATIONAL_DAY, or the
///   whole week when OPERATIONAL_DAY is empty.
/// - When OPERATIONAL_DAY names no weekend day (`MON-FRI`, `5 DAYS`),
///   Saturday and Sunday get no clauses at all.
/// - Weekday parts take `rate_weekday`, weekend parts take
///   `rate_after_hours_weekend`.
pub fn resolve_operational(
    operational_day: &str,
    operational_time: &str,
    rate_weekday: &str,
    rate_after_hours_weekend: &str,
) -> Result<Vec<OperationalClause>> {
    let op_days = parse_operational_days(operational_day)?;
    let weekday_rate = parse_rate(rate_weekday, Field::RateWeekday)?;
    let weekend_rate = parse_rate(rate_after_hours_weekend, Field::RateAfterHoursWeekend)?;

    if operational_time.trim().is_empty() {
        return Ok(Vec::new());
    }
    let ranges = parse_time_list(operational_time, Field::OperationalTime)?;

    let weekend_free = op_days.is_some_and(|d| d.intersection(DaySet::WEEKEND).is_empty());
    let allowed = if weekend_free { DaySet::WEEKDAYS } else { DaySet::ALL };
    let base = op_days.unwrap_or(DaySet::ALL);

    let mut clauses = Vec::new();
    for (range, qualifier) in ranges {
        let days = qualifier.unwrap_or(base).intersection(allowed);
        for (days, interval) in range.windows(days) {
            let days = days.intersection(allowed);
            let parts = [
                (days.intersection(DaySet::WEEKDAYS), weekday_rate),
                (days.intersection(DaySet::WEEKEND), weekend_rate),
            ];
            for (part, rate) in parts {
                if !part.is_empty() {
                    clauses.push(OperationalClause {
                        days: part,
                        interval,
                        rate,
                    });
                }
            }
        }
    }
    Ok(clauses)
}
