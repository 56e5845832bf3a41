//! Error types for parking-engine operations.

use std::fmt;

use thiserror::Error;

/// The input column a parse failure was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Restrictions,
    OperationalDay,
    OperationalTime,
    RateWeekday,
    RateAfterHoursWeekend,
}

impl Field {
    /// Column name as it appears in the meter dataset.
    pub fn column(self) -> &'static str {
        match self {
            Field::Restrictions => "RESTRICTIONS",
            Field::OperationalDay => "OPERATIONAL_DAY",
            Field::OperationalTime => "OPERATIONAL_TIME",
            Field::RateWeekday => "TAR_RATE_WEEKDAY",
            Field::RateAfterHoursWeekend => "TAR_RATE_AH_WE",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Errors raised while resolving a meter record into a week schedule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A time or day fragment could not be read unambiguously.
    #[error("Parse error in {field}: {reason} (at '{fragment}')")]
    Parse {
        field: Field,
        fragment: String,
        reason: String,
    },

    /// A word outside the known restriction/day vocabulary.
    #[error("Unrecognized token in {field}: '{token}'")]
    UnrecognizedToken { field: Field, token: String },

    /// A composited day broke the gapless/non-overlapping invariant.
    /// Always a defect in clause generation, never caused by input.
    #[error("Internal consistency error on {day}: {detail}")]
    InternalConsistency { day: &'static str, detail: String },
}

impl EngineError {
    pub(crate) fn parse(field: Field, fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Parse {
            field,
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unrecognized(field: Field, token: impl Into<String>) -> Self {
        EngineError::UnrecognizedToken {
            field,
            token: token.into(),
        }
    }

    /// True for errors caused by the input record itself. These are
    /// downgraded to a per-record failure marker by the batch driver.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::InternalConsistency { .. })
    }
}

/// A malformed engine options document.
#[derive(Error, Debug)]
#[error("Invalid engine options: {0}")]
pub struct OptionsError(#[from] serde_json::Error);

/// Convenience alias used throughout parking-engine.
pub type Result<T> = std::result::Result<T, EngineError>;
