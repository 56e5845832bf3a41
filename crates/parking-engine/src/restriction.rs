//! Restriction resolver: RESTRICTIONS text → restriction clauses.
//!
//! A restriction string is a sequence of clauses, each introduced by one or
//! more restriction kinds and followed by time ranges and day qualifiers:
//!
//! ```text
//! LZ 5AM-3PM M-F, BZ 3PM-7PM M-F & 12:30AM-6AM S-S
//! C/W 7-11AM,2-7PM & LZ 11AM-2PM MON-SAT TOWAWAY
//! TAXI ZONE ALL OTHER TIMES
//! ```
//!
//! Binding rules:
//!
//! - A bare day qualifier applies to every time range written since the
//!   previous bare qualifier, across clause boundaries. A bracketed qualifier
//!   applies only to the range directly before it.
//! - Ranges left without a qualifier at the end take the nearest preceding
//!   qualifier, or the whole week when there is none.
//! - Kind words written straight after a clause's times (`MON-FRI TOWAWAY`)
//!   label that clause rather than opening a new one.
//! - `&`-joined ranges with no kind of their own continue the current clause.

use serde::Serialize;

use crate::clock::{Interval, TimeRange};
use crate::days::DaySet;
use crate::error::{EngineError, Field, Result};
use crate::grammar::{tokenize, Lexeme, Token};

const FIELD: Field = Field::Restrictions;

/// The kinds of no-parking restriction found on meters. They all mean "no
/// parking" while active; the kind only labels the clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RestrictionKind {
    Clearway,
    LoadingZone,
    BusZone,
    Towaway,
    NoStopping,
    PassengerLoadingZone,
    MotorcycleParkingOnly,
    TaxiZone,
    JazzClub,
}

impl RestrictionKind {
    /// The canonical, unabbreviated signage name.
    pub fn name(self) -> &'static str {
        match self {
            RestrictionKind::Clearway => "CLEARWAY",
            RestrictionKind::LoadingZone => "LOADING ZONE",
            RestrictionKind::BusZone => "BUS ZONE",
            RestrictionKind::Towaway => "TOWAWAY",
            RestrictionKind::NoStopping => "NO STOPPING",
            RestrictionKind::PassengerLoadingZone => "PASSENGER LOADING ZONE",
            RestrictionKind::MotorcycleParkingOnly => "M/C PARKING ONLY",
            RestrictionKind::TaxiZone => "TAXI ZONE",
            RestrictionKind::JazzClub => "JAZZ CLUB",
        }
    }
}

/// A resolved restriction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestrictionClause {
    pub kind: RestrictionKind,
    /// Further kinds written on the same clause (`C/WAY & N/S`, trailing
    /// `TOWAWAY`).
    pub labels: Vec<RestrictionKind>,
    pub days: DaySet,
    /// `None` exactly when `relative` is set.
    pub interval: Option<Interval>,
    /// "ALL OTHER TIMES": active whenever the meter is not operational.
    pub relative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phrase {
    Kind(RestrictionKind),
    AllOtherTimes,
}

/// Word sequences, longest first so multi-word phrases win.
const PHRASES: &[(&[&str], Phrase)] = &[
    (&["PASSENGER", "LOADING", "ZONE"], Phrase::Kind(RestrictionKind::PassengerLoadingZone)),
    (&["M/C", "PARKING", "ONLY"], Phrase::Kind(RestrictionKind::MotorcycleParkingOnly)),
    (&["ALL", "OTHER", "TIMES"], Phrase::AllOtherTimes),
    (&["LOADING", "ZONE"], Phrase::Kind(RestrictionKind::LoadingZone)),
    (&["BUS", "ZONE"], Phrase::Kind(RestrictionKind::BusZone)),
    (&["TAXI", "ZONE"], Phrase::Kind(RestrictionKind::TaxiZone)),
    (&["NO", "STOPPING"], Phrase::Kind(RestrictionKind::NoStopping)),
    (&["JAZZ", "CLUB"], Phrase::Kind(RestrictionKind::JazzClub)),
    (&["TOW", "AWAY"], Phrase::Kind(RestrictionKind::Towaway)),
    (&["CLEARWAY"], Phrase::Kind(RestrictionKind::Clearway)),
    (&["C/WAY"], Phrase::Kind(RestrictionKind::Clearway)),
    (&["C/W"], Phrase::Kind(RestrictionKind::Clearway)),
    (&["LZ"], Phrase::Kind(RestrictionKind::LoadingZone)),
    (&["BZ"], Phrase::Kind(RestrictionKind::BusZone)),
    (&["N/S"], Phrase::Kind(RestrictionKind::NoStopping)),
    (&["TOWAWAY"], Phrase::Kind(RestrictionKind::Towaway)),
];

/// Structural items after phrase matching.
#[derive(Debug, Clone)]
enum Item {
    Phrase(Phrase),
    Time(TimeRange),
    Days { days: DaySet, bracketed: bool, text: String },
    Separator,
}

fn match_phrases(lexemes: Vec<Lexeme>) -> Result<Vec<Item>> {
    let mut items = Vec::with_capacity(lexemes.len());
    let mut i = 0;
    while i < lexemes.len() {
        match &lexemes[i].token {
            Token::Word(word) => {
                let (phrase, used) = longest_phrase(&lexemes[i..])
                    .ok_or_else(|| EngineError::unrecognized(FIELD, word.clone()))?;
                items.push(Item::Phrase(phrase));
                i += used;
                continue;
            }
            Token::Time(range) => items.push(Item::Time(*range)),
            Token::Days { days, bracketed } => items.push(Item::Days {
                days: *days,
                bracketed: *bracketed,
                text: lexemes[i].text.clone(),
            }),
            Token::Comma | Token::Amp => items.push(Item::Separator),
        }
        i += 1;
    }
    Ok(items)
}

fn longest_phrase(lexemes: &[Lexeme]) -> Option<(Phrase, usize)> {
    PHRASES.iter().find_map(|(words, phrase)| {
        let matches = words.len() <= lexemes.len()
            && words
                .iter()
                .zip(lexemes)
                .all(|(w, l)| matches!(&l.token, Token::Word(t) if t == w));
        matches.then_some((*phrase, words.len()))
    })
}

/// One entry waiting for, or holding, its day set.
#[derive(Debug)]
struct Entry {
    range: Option<TimeRange>,
    days: Option<DaySet>,
}

#[derive(Debug)]
struct Group {
    kinds: Vec<RestrictionKind>,
    entries: Vec<Entry>,
    /// Opened by a kind word directly after times or days, with no separator
    /// in between.
    trailing: bool,
}

/// Parse a RESTRICTIONS value. Empty input yields no clauses.
pub fn resolve_restrictions(input: &str) -> Result<Vec<RestrictionClause>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items = match_phrases(tokenize(input, FIELD)?)?;

    let mut groups: Vec<Group> = Vec::new();
    // (group, entry) pairs still waiting for a bare day qualifier.
    let mut pending: Vec<(usize, usize)> = Vec::new();
    let mut last_days: Option<DaySet> = None;
    let mut after_separator = true;

    for item in items {
        match item {
            Item::Phrase(Phrase::Kind(kind)) => {
                let open_new = !groups.last().is_some_and(|g| g.entries.is_empty());
                if open_new {
                    let trailing = !groups.is_empty() && !after_separator;
                    groups.push(Group {
                        kinds: vec![kind],
                        entries: Vec::new(),
                        trailing,
                    });
                } else if let Some(group) = groups.last_mut() {
                    group.kinds.push(kind);
                }
                after_separator = false;
            }
            Item::Phrase(Phrase::AllOtherTimes) | Item::Time(_) => {
                let range = match item {
                    Item::Time(range) => Some(range),
                    _ => None,
                };
                let Some(group_idx) = groups.len().checked_sub(1) else {
                    return Err(EngineError::parse(FIELD, input.trim(), "time given before any restriction kind"));
                };
                let group = &mut groups[group_idx];
                group.trailing = false;
                group.entries.push(Entry { range, days: None });
                pending.push((group_idx, group.entries.len() - 1));
                after_separator = false;
            }
            Item::Days { days, bracketed, text } => {
                if bracketed {
                    let target = groups
                        .last_mut()
                        .and_then(|g| g.entries.last_mut())
                        .filter(|e| e.days.is_none());
                    match target {
                        Some(entry) => entry.days = Some(days),
                        None => return Err(EngineError::parse(FIELD, text, "day qualifier without a time range")),
                    }
                    pending.pop();
                } else {
                    if pending.is_empty() {
                        return Err(EngineError::parse(FIELD, text, "day qualifier without a time range"));
                    }
                    for (g, e) in pending.drain(..) {
                        groups[g].entries[e].days = Some(days);
                    }
                    last_days = Some(days);
                }
                after_separator = false;
            }
            Item::Separator => {
                fold_trailing(&mut groups);
                after_separator = true;
            }
        }
    }
    fold_trailing(&mut groups);

    let fallback = last_days.unwrap_or(DaySet::ALL);
    for (g, e) in pending {
        groups[g].entries[e].days = Some(fallback);
    }

    let mut clauses = Vec::new();
    for group in groups {
        if group.entries.is_empty() {
            let names: Vec<&str> = group.kinds.iter().map(|k| k.name()).collect();
            return Err(EngineError::parse(FIELD, names.join(" "), "restriction without a time range"));
        }
        let Some((&kind, labels)) = group.kinds.split_first() else {
            continue;
        };
        let labels = labels.to_vec();
        for entry in group.entries {
            let days = entry.days.unwrap_or(fallback);
            match entry.range {
                Some(range) => {
                    for (days, interval) in range.windows(days) {
                        clauses.push(RestrictionClause {
                            kind,
                            labels: labels.clone(),
                            days,
                            interval: Some(interval),
                            relative: false,
                        });
                    }
                }
                None => clauses.push(RestrictionClause {
                    kind,
                    labels: labels.clone(),
                    days,
                    interval: None,
                    relative: true,
                }),
            }
        }
    }
    log::debug!("restrictions '{}' resolved to {} clauses", input.trim(), clauses.len());
    Ok(clauses)
}

/// Merge a trailing, time-less group into the clause before it as labels.
fn fold_trailing(groups: &mut Vec<Group>) {
    let fold = groups
        .last()
        .is_some_and(|g| g.trailing && g.entries.is_empty() && groups.len() > 1);
    if !fold {
        return;
    }
    if let Some(group) = groups.pop() {
        if let Some(previous) = groups.last_mut() {
            for kind in group.kinds {
                if kind != previous.kinds[0] && !previous.kinds.contains(&kind) {
                    previous.kinds.push(kind);
                }
            }
        }
    }
}
