//! Time grammar: turns restriction and operational strings into tokens.
//!
//! The lexer understands exactly three kinds of content:
//!
//! - clock ranges: `7AM-7PM`, `7-11AM`, `9AM-16:00`, `12:30AM-6AM`, `24 HOURS`
//! - day qualifiers: `MON-FRI`, `M-F`, `S-S`, `SAT,SUN`, `7 DAYS`, `(MON-FRI)`
//! - plain words, left for the caller to match against its own vocabulary
//!
//! plus the `,` and `&` separators. Anything else is an error. Nothing is
//! skipped silently.
//!
//! # Meridiem inheritance
//!
//! In a compact range such as `7-11AM` the first bound borrows the meridiem of
//! the second. When the first bound reads later on a 12-hour dial than the
//! second (`11-2PM`), it takes the opposite meridiem instead, so `11-2PM` is
//! 11:00-14:00. A range without any meridiem must use 24-hour notation on at
//! least one side (`9-16:00`, `07:00-19:00`); `7-11` alone is ambiguous.

use crate::clock::{TimePoint, TimeRange};
use crate::days::{day_count, day_pair, day_word, DaySet};
use crate::error::{EngineError, Field, Result};

/// A lexical unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Time(TimeRange),
    /// `bracketed` is set for `(MON-FRI)` style qualifiers, which bind only
    /// to the range written directly before them.
    Days {
        days: DaySet,
        bracketed: bool,
    },
    Word(String),
    Comma,
    Amp,
}

/// A token together with the (upper-cased) source text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub text: String,
}

/// Split `input` into lexemes. Input is case-insensitive.
pub fn tokenize(input: &str, field: Field) -> Result<Vec<Lexeme>> {
    Lexer::new(input, field).run()
}

/// Parse a comma-separated list of clock ranges, each optionally followed by
/// its own day qualifier (`7AM-7PM,7PM-10PM(MON-FRI),7AM-7PM(SAT,SUN)`).
pub fn parse_time_list(input: &str, field: Field) -> Result<Vec<(TimeRange, Option<DaySet>)>> {
    let mut ranges: Vec<(TimeRange, Option<DaySet>)> = Vec::new();
    for lexeme in tokenize(input, field)? {
        match lexeme.token {
            Token::Time(range) => ranges.push((range, None)),
            Token::Days { days, .. } => match ranges.last_mut() {
                Some((_, slot @ None)) => *slot = Some(days),
                Some((_, Some(_))) => {
                    return Err(EngineError::parse(
                        field,
                        lexeme.text,
                        "second day qualifier for one time range",
                    ))
                }
                None => {
                    return Err(EngineError::parse(
                        field,
                        lexeme.text,
                        "day qualifier before any time range",
                    ))
                }
            },
            Token::Comma | Token::Amp => {}
            Token::Word(word) => return Err(EngineError::unrecognized(field, word)),
        }
    }
    Ok(ranges)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn opposite(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

/// One side of a clock range as written.
#[derive(Debug, Clone, Copy)]
struct Bound {
    hour: u16,
    minute: Option<u16>,
    meridiem: Option<Meridiem>,
}

impl Bound {
    /// Position on a 12-hour dial, where 12 reads as 0.
    fn dial_minutes(&self) -> u16 {
        (self.hour % 12) * 60 + self.minute.unwrap_or(0)
    }

    /// Only readable as a 24-hour clock value.
    fn is_twenty_four_hour(&self) -> bool {
        self.hour > 12 || self.hour == 0
    }

    fn to_point(self, meridiem: Option<Meridiem>) -> std::result::Result<TimePoint, &'static str> {
        let minute = self.minute.unwrap_or(0);
        match meridiem {
            Some(m) => {
                if self.hour == 0 || self.hour > 12 {
                    return Err("hour out of range for AM/PM");
                }
                let offset = if m == Meridiem::Pm { 12 } else { 0 };
                TimePoint::from_hm(self.hour % 12 + offset, minute).ok_or("minute out of range")
            }
            None => TimePoint::from_hm(self.hour, minute).ok_or("time out of range"),
        }
    }
}

fn resolve_range(first: Bound, second: Bound) -> std::result::Result<TimeRange, &'static str> {
    let (start_meridiem, end_meridiem) = match (first.meridiem, second.meridiem) {
        (Some(a), Some(b)) => (Some(a), Some(b)),
        (None, Some(b)) if first.is_twenty_four_hour() => (None, Some(b)),
        (None, Some(b)) => {
            let inherited = if first.dial_minutes() > second.dial_minutes() {
                b.opposite()
            } else {
                b
            };
            (Some(inherited), Some(b))
        }
        // After an AM/PM start, a bare end hour of 1-12 is ambiguous (`4PM-7:30`).
        (Some(a), None) if second.is_twenty_four_hour() => (Some(a), None),
        (Some(_), None) => return Err("end time needs AM/PM or 24-hour form"),
        (None, None) => {
            let explicit = |b: &Bound| b.is_twenty_four_hour() || b.minute.is_some();
            if !explicit(&first) && !explicit(&second) {
                return Err("ambiguous time range without AM/PM");
            }
            (None, None)
        }
    };

    let start = first.to_point(start_meridiem)?;
    let mut end = second.to_point(end_meridiem)?;
    if start.is_end_of_day() {
        return Err("range cannot start at 24:00");
    }
    // 00:00 and 23:59 as an end both mean the end of the day.
    if end == TimePoint::MIDNIGHT || end.minutes() == TimePoint::END_OF_DAY.minutes() - 1 {
        end = TimePoint::END_OF_DAY;
    }
    if start == end {
        return Err("empty time range");
    }
    Ok(TimeRange { start, end })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '/' || c == '.' || c == '\''
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    field: Field,
}

impl Lexer {
    fn new(input: &str, field: Field) -> Self {
        let chars = input
            .to_uppercase()
            .chars()
            .map(|c| match c {
                '\u{2013}' | '\u{2014}' => '-',
                other => other,
            })
            .collect();
        Lexer {
            chars,
            pos: 0,
            field,
        }
    }

    fn run(mut self) -> Result<Vec<Lexeme>> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            let Some(c) = self.peek() else { break };
            let start = self.pos;
            let token = match c {
                ',' | ';' => {
                    self.pos += 1;
                    Token::Comma
                }
                '&' => {
                    self.pos += 1;
                    Token::Amp
                }
                '(' => self.bracketed_days()?,
                c if c.is_ascii_digit() => self.numeric()?,
                c if c.is_ascii_alphabetic() => self.word()?,
                other => return Err(EngineError::unrecognized(self.field, other.to_string())),
            };
            out.push(Lexeme {
                token,
                text: self.slice(start, self.pos),
            });
        }
        Ok(out)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn slice(&self, from: usize, to: usize) -> String {
        self.chars[from..to.min(self.chars.len())].iter().collect()
    }

    /// The word starting at `pos` (without consuming it), with trailing dots
    /// removed, and the position just past it.
    fn word_at(&self, pos: usize) -> (String, usize) {
        let mut end = pos;
        while self.peek_at(end).is_some_and(is_word_char) {
            end += 1;
        }
        let word = self.slice(pos, end).trim_end_matches('.').to_string();
        (word, end)
    }

    fn read_digits(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    fn rest(&self, from: usize) -> String {
        self.slice(from, self.chars.len()).trim().to_string()
    }

    fn bracketed_days(&mut self) -> Result<Token> {
        let open = self.pos;
        let close = self.chars[open..]
            .iter()
            .position(|&c| c == ')')
            .map(|offset| open + offset)
            .ok_or_else(|| EngineError::parse(self.field, self.rest(open), "unclosed '('"))?;
        let inner = self.slice(open + 1, close);
        self.pos = close + 1;

        let mut days = DaySet::EMPTY;
        for lexeme in tokenize(&inner, self.field)? {
            match lexeme.token {
                Token::Days { days: d, .. } => days = days.union(d),
                Token::Comma | Token::Amp => {}
                _ => {
                    return Err(EngineError::parse(
                        self.field,
                        format!("({inner})"),
                        "expected days inside parentheses",
                    ))
                }
            }
        }
        if days.is_empty() {
            return Err(EngineError::parse(self.field, "()", "empty day qualifier"));
        }
        Ok(Token::Days {
            days,
            bracketed: true,
        })
    }

    /// A digit opens either `N DAYS`, `24 HOURS` or a clock range.
    fn numeric(&mut self) -> Result<Token> {
        let start = self.pos;
        let digits = self.read_digits();
        let mut after = self.pos;
        while self.peek_at(after).is_some_and(char::is_whitespace) {
            after += 1;
        }
        let (word, end) = self.word_at(after);
        match word.as_str() {
            "DAYS" | "DAY" => {
                self.pos = end;
                let days = digits
                    .parse()
                    .ok()
                    .and_then(day_count)
                    .ok_or_else(|| EngineError::parse(self.field, self.slice(start, end), "unsupported day count"))?;
                return Ok(Token::Days {
                    days,
                    bracketed: false,
                });
            }
            "HOURS" | "HOUR" | "HRS" | "HR" if digits == "24" => {
                self.pos = end;
                return Ok(Token::Time(TimeRange::ALL_DAY));
            }
            _ => {}
        }
        self.pos = start;
        self.time_range().map(Token::Time)
    }

    fn time_range(&mut self) -> Result<TimeRange> {
        let start = self.pos;
        let first = self.bound(start)?;
        self.skip_ws();
        let (word, word_end) = self.word_at(self.pos);
        if self.peek() == Some('-') {
            self.pos += 1;
        } else if word == "TO" {
            self.pos = word_end;
        } else {
            return Err(EngineError::parse(
                self.field,
                self.slice(start, self.pos).trim_end(),
                "expected a time range",
            ));
        }
        self.skip_ws();
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(EngineError::parse(self.field, self.rest(start), "missing end time"));
        }
        let second = self.bound(start)?;
        let text = self.slice(start, self.pos);
        resolve_range(first, second).map_err(|reason| EngineError::parse(self.field, text, reason))
    }

    fn bound(&mut self, range_start: usize) -> Result<Bound> {
        let digits = self.read_digits();
        let hour: u16 = match digits.len() {
            1 | 2 => digits.parse().unwrap_or(u16::MAX),
            _ => u16::MAX,
        };
        if hour == u16::MAX {
            return Err(EngineError::parse(self.field, self.rest(range_start), "bad hour"));
        }

        let mut minute = None;
        if matches!(self.peek(), Some(':') | Some('.')) {
            let m0 = self.peek_at(self.pos + 1);
            let m1 = self.peek_at(self.pos + 2);
            if let (Some(a), Some(b)) = (m0, m1) {
                if a.is_ascii_digit() && b.is_ascii_digit() {
                    minute = Some(self.slice(self.pos + 1, self.pos + 3).parse().unwrap_or(60));
                    self.pos += 3;
                }
            }
        }

        let mut after = self.pos;
        while self.peek_at(after).is_some_and(char::is_whitespace) {
            after += 1;
        }
        let (word, end) = self.word_at(after);
        let meridiem = match word.replace('.', "").as_str() {
            "AM" => Some(Meridiem::Am),
            "PM" => Some(Meridiem::Pm),
            _ => None,
        };
        if meridiem.is_some() {
            self.pos = end;
        }
        Ok(Bound {
            hour,
            minute,
            meridiem,
        })
    }

    /// Start of the word after a `-` that follows `pos`, with optional
    /// whitespace on either side of the hyphen.
    fn after_hyphen(&self, pos: usize) -> Option<usize> {
        let mut at = pos;
        while self.peek_at(at).is_some_and(char::is_whitespace) {
            at += 1;
        }
        if self.peek_at(at) != Some('-') {
            return None;
        }
        at += 1;
        while self.peek_at(at).is_some_and(char::is_whitespace) {
            at += 1;
        }
        self.peek_at(at).is_some_and(|c| c.is_ascii_alphabetic()).then_some(at)
    }

    fn word(&mut self) -> Result<Token> {
        let (first, end) = self.word_at(self.pos);
        self.pos = end;
        if let Some(next) = self.after_hyphen(end) {
            let (second, second_end) = self.word_at(next);
            if let Some(days) = day_pair(&first, &second) {
                self.pos = second_end;
                return Ok(self.day_list(days));
            }
            if next == end + 1 {
                self.pos = second_end;
                return Ok(Token::Word(format!("{first}-{second}")));
            }
        }
        match day_word(&first) {
            Some(days) => Ok(self.day_list(days)),
            None => Ok(Token::Word(first)),
        }
    }

    /// Extend a day qualifier across `,`-joined day items (`SAT,SUN`).
    fn day_list(&mut self, mut days: DaySet) -> Token {
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.peek() != Some(',') {
                self.pos = save;
                break;
            }
            self.pos += 1;
            self.skip_ws();
            match self.day_item() {
                Some(more) => days = days.union(more),
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        Token::Days {
            days,
            bracketed: false,
        }
    }

    /// A single day word or hyphenated pair at the cursor, consumed only when
    /// it is one.
    fn day_item(&mut self) -> Option<DaySet> {
        let (first, end) = self.word_at(self.pos);
        if first.is_empty() {
            return None;
        }
        if let Some(next) = self.after_hyphen(end) {
            let (second, second_end) = self.word_at(next);
            let days = day_pair(&first, &second)?;
            self.pos = second_end;
            return Some(days);
        }
        let days = day_word(&first)?;
        self.pos = end;
        Some(days)
    }
}
