//! Parses the free-form date strings authors put in `post.cfg` into
//! comparable [`NaiveDateTime`] values. Only the parsed value is used for
//! ordering; pages always show the date exactly as authored.
//!
//! The input is split into numbers, words, and separators, and each field is
//! recognised by its shape rather than by matching a fixed list of formats:
//!
//! * numeric dates: `2024-06-15`, `2024/06/15`, `2024-06`, `06/2024`,
//!   `03/04/2024` (month first), `25/12/2024` and `15.06.2024` (day first
//!   when the first field can't be a month), `1/2/24`
//! * month names, full or abbreviated, with or without a period:
//!   `June 15, 2024`, `Jun. 15th, 2024`, `15 June 2024`, `15-Jun-2024`,
//!   `January 5, 24`, `June 2024` (the 1st of the month)
//! * compact `20240615`
//! * an optional weekday, ignored: `Friday, January 5, 2024`
//! * an optional time: `13:05`, `13:05:09.5`, `3:00 PM`, with an optional
//!   offset `+02:00`, `-0500`, `Z`, `UTC`, `GMT`
//!
//! Years must be written with four digits, or two digits which are expanded
//! to the closest century (within 50 years of the current year). A year is
//! required; missing times are midnight. Values with an offset are converted
//! to UTC.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const ORDINALS: [&str; 4] = ["st", "nd", "rd", "th"];

const FILLERS: [&str; 4] = ["t", "at", "on", "of"];

const UTC_NAMES: [&str; 3] = ["z", "utc", "gmt"];

/// Parses `input` into a [`NaiveDateTime`]. See the module documentation for
/// the accepted forms.
pub fn parse(input: &str) -> Result<NaiveDateTime> {
    parse_with_year(input, Utc::now().year()).ok_or_else(|| Error::new(input))
}

fn parse_with_year(input: &str, this_year: i32) -> Option<NaiveDateTime> {
    let tokens = tokenize(input)?;
    let mut fields = Fields::new(this_year);
    let mut i = 0;
    while i < tokens.len() {
        i = fields.consume(&tokens, i)?;
    }
    fields.finish()
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Word(String),
    Sep(char),
}

// Splits on whitespace and commas. Runs of digits and runs of letters become
// one token each; `- / . : +` are kept as separators. Anything else fails.
fn tokenize(input: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if c.is_ascii_digit() {
            let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            tokens.push(Token::Number(&rest[..end]));
            rest = &rest[end..];
        } else if c.is_alphabetic() {
            let end = rest.find(|c: char| !c.is_alphabetic()).unwrap_or(rest.len());
            tokens.push(Token::Word(rest[..end].to_lowercase()));
            rest = &rest[end..];
        } else {
            match c {
                '-' | '/' | '.' | ':' | '+' => tokens.push(Token::Sep(c)),
                ',' => {}
                _ if c.is_whitespace() => {}
                _ => return None,
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    Some(tokens)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Number {
    value: u32,
    digits: usize,
}

impl Number {
    fn parse(s: &str) -> Option<Number> {
        if s.len() > 9 {
            return None;
        }
        Some(Number {
            value: s.parse().ok()?,
            digits: s.len(),
        })
    }
}

#[derive(Clone, Copy, Debug)]
enum Part {
    Number(Number),
    Month(u32),
}

fn month(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(word))
        .map(|i| i as u32 + 1)
}

fn is_weekday(word: &str) -> bool {
    word.len() >= 3 && WEEKDAYS.iter().any(|d| d.starts_with(word))
}

fn part(token: Option<&Token>) -> Option<Part> {
    match token? {
        Token::Number(n) => Number::parse(n).map(Part::Number),
        Token::Word(w) => month(w).map(Part::Month),
        Token::Sep(_) => None,
    }
}

/// The fields recognised so far.
struct Fields {
    this_year: i32,

    /// A fully numeric date such as `2024-06-15` or `25/12/2024`.
    numeric: Option<(i32, u32, u32)>,

    /// A month given by name.
    named_month: Option<u32>,

    /// Numbers standing on their own, to be read as day and year around a
    /// named month, or as a compact `YYYYMMDD` date.
    loose: Vec<Number>,

    time: Option<NaiveTime>,

    /// Seconds east of UTC.
    offset: Option<i64>,
}

impl Fields {
    fn new(this_year: i32) -> Fields {
        Fields {
            this_year,
            numeric: None,
            named_month: None,
            loose: Vec::new(),
            time: None,
            offset: None,
        }
    }

    // Consumes the field starting at `tokens[i]` and returns the index of the
    // next unconsumed token.
    fn consume(&mut self, tokens: &[Token], i: usize) -> Option<usize> {
        match &tokens[i] {
            Token::Number(n) => match tokens.get(i + 1) {
                Some(Token::Sep(':')) => self.time(tokens, i),
                Some(Token::Sep(sep @ ('-' | '/' | '.'))) if part(tokens.get(i + 2)).is_some() => {
                    self.date_group(tokens, i, *sep)
                }
                _ => {
                    self.loose.push(Number::parse(n)?);
                    match tokens.get(i + 1) {
                        Some(Token::Word(w)) if ORDINALS.contains(&w.as_str()) => Some(i + 2),
                        _ => Some(i + 1),
                    }
                }
            },
            Token::Word(w) => {
                if let Some(m) = month(w) {
                    self.set_named_month(m)?;
                } else if UTC_NAMES.contains(&w.as_str()) {
                    self.set_offset(0)?;
                } else if !is_weekday(w) && !FILLERS.contains(&w.as_str()) {
                    return None;
                }
                // `Jun.`, `Fri.`
                match tokens.get(i + 1) {
                    Some(Token::Sep('.')) => Some(i + 2),
                    _ => Some(i + 1),
                }
            }
            Token::Sep(_) => None,
        }
    }

    // Parses `H:MM[:SS[.fraction]] [am|pm] [(+|-)HH[:]MM]` starting at
    // `tokens[i]`.
    fn time(&mut self, tokens: &[Token], mut i: usize) -> Option<usize> {
        if self.time.is_some() {
            return None;
        }
        let hour = number_at(tokens, i).filter(|n| n.digits <= 2)?;
        let minute = number_at(tokens, i + 2).filter(|n| n.digits == 2)?;
        i += 3;

        let mut second = 0;
        let mut nanos = 0;
        if tokens.get(i) == Some(&Token::Sep(':')) {
            second = number_at(tokens, i + 1).filter(|n| n.digits == 2)?.value;
            i += 2;
            if tokens.get(i) == Some(&Token::Sep('.')) {
                if let Some(Token::Number(fraction)) = tokens.get(i + 1) {
                    nanos = fraction_nanos(fraction);
                    i += 2;
                }
            }
        }

        let mut hour = hour.value;
        if let Some(Token::Word(w)) = tokens.get(i) {
            let pm = match w.as_str() {
                "am" => Some(false),
                "pm" => Some(true),
                _ => None,
            };
            if let Some(pm) = pm {
                if hour == 0 || hour > 12 {
                    return None;
                }
                hour = match (pm, hour) {
                    (false, 12) => 0,
                    (true, 12) => 12,
                    (true, h) => h + 12,
                    (false, h) => h,
                };
                i += 1;
            }
        }

        if let Some(Token::Sep(sign @ ('+' | '-'))) = tokens.get(i) {
            let (seconds, next) = offset(tokens, i + 1)?;
            self.set_offset(if *sign == '-' { -seconds } else { seconds })?;
            i = next;
        }

        self.time = Some(NaiveTime::from_hms_nano_opt(hour, minute.value, second, nanos)?);
        Some(i)
    }

    // Parses up to three numbers or month names joined by the same `sep`.
    fn date_group(&mut self, tokens: &[Token], mut i: usize, sep: char) -> Option<usize> {
        let mut parts = vec![part(tokens.get(i))?];
        i += 1;
        while tokens.get(i) == Some(&Token::Sep(sep)) {
            match part(tokens.get(i + 1)) {
                Some(p) => parts.push(p),
                None => break,
            }
            i += 2;
        }
        if parts.len() > 3 {
            return None;
        }

        if parts.iter().any(|p| matches!(p, Part::Month(_))) {
            for p in parts {
                match p {
                    Part::Month(m) => self.set_named_month(m)?,
                    Part::Number(n) => self.loose.push(n),
                }
            }
            return Some(i);
        }

        let numbers: Vec<Number> = parts
            .into_iter()
            .filter_map(|p| match p {
                Part::Number(n) => Some(n),
                Part::Month(_) => None,
            })
            .collect();
        let ymd = match numbers.as_slice() {
            [y, m, d] if y.digits == 4 && m.digits <= 2 && d.digits <= 2 => {
                (y.value as i32, m.value, d.value)
            }
            [a, b, y] if a.digits <= 2 && b.digits <= 2 => {
                let year = self.year(y)?;
                match a.value > 12 {
                    true => (year, b.value, a.value),
                    false => (year, a.value, b.value),
                }
            }
            [y, m] if y.digits == 4 && m.digits <= 2 => (y.value as i32, m.value, 1),
            [m, y] if m.digits <= 2 && y.digits == 4 => (y.value as i32, m.value, 1),
            _ => return None,
        };
        if self.numeric.is_some() {
            return None;
        }
        self.numeric = Some(ymd);
        Some(i)
    }

    // A four-digit year as written, or a two-digit year in the century that
    // puts it within 50 years of the current year.
    fn year(&self, n: &Number) -> Option<i32> {
        match n.digits {
            4 => Some(n.value as i32),
            2 => Some(expand_year(n.value as i32, self.this_year)),
            _ => None,
        }
    }

    fn set_named_month(&mut self, m: u32) -> Option<()> {
        match self.named_month.replace(m) {
            Some(_) => None,
            None => Some(()),
        }
    }

    fn set_offset(&mut self, seconds: i64) -> Option<()> {
        match self.offset.replace(seconds) {
            Some(_) => None,
            None => Some(()),
        }
    }

    fn finish(self) -> Option<NaiveDateTime> {
        let date = match (self.numeric, self.named_month) {
            (Some((y, m, d)), None) if self.loose.is_empty() => NaiveDate::from_ymd_opt(y, m, d)?,
            (None, Some(m)) => {
                let (years, rest): (Vec<Number>, Vec<Number>) =
                    self.loose.iter().partition(|n| n.digits == 4);
                let (year, day) = match (years.as_slice(), rest.as_slice()) {
                    ([y], []) => (y.value as i32, 1),
                    ([y], [d]) if d.digits <= 2 => (y.value as i32, d.value),
                    ([], [d, y]) if d.digits <= 2 && y.digits == 2 => (self.year(y)?, d.value),
                    _ => return None,
                };
                NaiveDate::from_ymd_opt(year, m, day)?
            }
            (None, None) => match self.loose.as_slice() {
                [n] if n.digits == 8 => {
                    NaiveDate::from_ymd_opt((n.value / 10000) as i32, n.value / 100 % 100, n.value % 100)?
                }
                _ => return None,
            },
            _ => return None,
        };

        let time = match self.time {
            Some(time) => time,
            None => NaiveTime::from_hms_opt(0, 0, 0)?,
        };
        let local = date.and_time(time);
        match self.offset {
            Some(seconds) => local.checked_sub_signed(Duration::seconds(seconds)),
            None => Some(local),
        }
    }
}

fn number_at(tokens: &[Token], i: usize) -> Option<Number> {
    match tokens.get(i)? {
        Token::Number(n) => Number::parse(n),
        _ => None,
    }
}

// `05` → 500_000_000. Digits past nanoseconds are dropped.
fn fraction_nanos(fraction: &str) -> u32 {
    let digits = &fraction[..fraction.len().min(9)];
    let padded = format!("{:0<9}", digits);
    padded.parse().unwrap_or(0)
}

// Parses `HHMM`, `HH`, or `HH:MM` at `tokens[i]` into seconds.
fn offset(tokens: &[Token], i: usize) -> Option<(i64, usize)> {
    let n = match tokens.get(i)? {
        Token::Number(n) => *n,
        _ => return None,
    };
    let (hours, minutes, next) = match n.len() {
        4 => (n[..2].parse::<i64>().ok()?, n[2..].parse::<i64>().ok()?, i + 1),
        2 => match (tokens.get(i + 1), number_at(tokens, i + 2)) {
            (Some(Token::Sep(':')), Some(m)) if m.digits == 2 => {
                (n.parse::<i64>().ok()?, m.value as i64, i + 3)
            }
            _ => (n.parse::<i64>().ok()?, 0, i + 1),
        },
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some((hours * 3600 + minutes * 60, next))
}

fn expand_year(two_digits: i32, this_year: i32) -> i32 {
    let year = two_digits + this_year / 100 * 100;
    if year >= this_year + 50 {
        year - 100
    } else if year < this_year - 50 {
        year + 100
    } else {
        year
    }
}

/// The result of a fallible date-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when a date string matches none of the accepted forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    input: String,
}

impl Error {
    fn new(input: &str) -> Error {
        Error {
            input: input.to_owned(),
        }
    }

    /// The string that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unrecognized date `{}`", self.input)
    }
}

impl std::error::Error for Error {}
