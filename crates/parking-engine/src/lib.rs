//! # parking-engine
//!
//! Deterministic weekly parking-availability schedules for paid parking
//! meters.
//!
//! Meter datasets describe when a bay may be used with short, irregular
//! strings such as `C/W 7-11AM,2-7PM & LZ 11AM-2PM MON-SAT TOWAWAY` and
//! `7AM-7PM,7PM-10PM(MON-FRI)`. This crate reads them with an explicit
//! grammar and rule engine and produces, for every day of the week, a gapless
//! minute-accurate timeline of Free, Paid and No parking segments. Input that
//! falls outside the known vocabulary is reported as an error, never guessed.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::Weekday;
//! use parking_engine::{resolve_record, MeterRecord};
//!
//! let record = MeterRecord {
//!     restrictions: Some("CLEARWAY 7AM-9AM,4PM-7PM MON-FRI TOWAWAY".into()),
//!     operational_day: Some("MON-FRI".into()),
//!     operational_time: Some("9AM-16:00".into()),
//!     tar_rate_weekday: Some("6.15".into()),
//!     ..MeterRecord::default()
//! };
//! let week = resolve_record(&record).unwrap();
//! assert_eq!(week.day(Weekday::Mon).segments().len(), 5);
//! assert!(week.day(Weekday::Sat).is_all_free());
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] — clock ranges, day qualifiers and words from raw text
//! - [`restriction`] — RESTRICTIONS → restriction clauses
//! - [`operational`] — OPERATIONAL_DAY/TIME and tariffs → operational clauses
//! - [`compositor`] — clauses → classified day timelines
//! - [`record`] — per-record and batch processing with failure isolation
//! - [`schedule`] — segment, day and week schedule types
//! - [`clock`] / [`days`] — minute-of-day and weekday-set primitives
//! - [`options`] — engine configuration
//! - [`error`] — Error types

pub mod clock;
pub mod compositor;
pub mod days;
pub mod error;
pub mod grammar;
pub mod operational;
pub mod options;
pub mod record;
pub mod restriction;
pub mod schedule;

pub use clock::{Interval, TimePoint, TimeRange};
pub use compositor::{compose_day, compose_week};
pub use days::DaySet;
pub use error::{EngineError, Field, OptionsError};
pub use operational::{resolve_operational, OperationalClause};
pub use options::{EndOfDay, EngineOptions};
pub use record::{process_batch, process_record, resolve_record, MeterRecord, ProcessedRecord};
pub use restriction::{resolve_restrictions, RestrictionClause, RestrictionKind};
pub use schedule::{DaySchedule, Segment, SegmentKind, WeekSchedule};
