//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// How the end-of-day boundary is written in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndOfDay {
    /// `"24:00"`.
    #[default]
    Midnight,
    /// `"23:59"`, as spreadsheet consumers of the meter dataset expect.
    LastMinute,
}

impl EndOfDay {
    pub fn label(self) -> &'static str {
        match self {
            EndOfDay::Midnight => "24:00",
            EndOfDay::LastMinute => "23:59",
        }
    }
}

/// Options for [`crate::record::process_batch`] and column rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub end_of_day: EndOfDay,
    /// Resolve records on the rayon thread pool.
    pub parallel: bool,
    /// Turn internal consistency errors into failed records instead of
    /// aborting the batch.
    pub skip_inconsistent: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            end_of_day: EndOfDay::default(),
            parallel: true,
            skip_inconsistent: false,
        }
    }
}

impl EngineOptions {
    /// Load options from a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }
}
