//! Date values
//!
//! A VBScript Date is an OLE-automation serial: whole days since ZeroDate
//! (1899-12-30) plus the time of day as a fraction. For negative serials the
//! fraction is still a positive time offset, so `-400.2` is day -400 at
//! 04:48, which is later than `-400.0`. Arithmetic therefore goes through a
//! "linear" day count where that asymmetry is removed.

use crate::error::{RuntimeError, RuntimeResult};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use vbs_config::DateOrder;

/// Serial of `EarliestPossibleDate` (0100-01-01)
pub const EARLIEST_DAY: f64 = -657_434.0;
/// Serial day of `LatestPossibleDate` (9999-12-31)
pub const LATEST_DAY: f64 = 2_958_465.0;

/// On the latest day, fractions at or above half a millisecond before
/// midnight would roll over into year 10000.
pub const LATEST_DAY_FRACTION_LIMIT: f64 = 0.999_999_994_212_963;
/// On the earliest day the time must stay a full millisecond clear of
/// midnight.
pub const EARLIEST_DAY_FRACTION_LIMIT: f64 = 0.999_999_988_425_926;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Date/time value stored as an OLE-automation serial.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct VbDate(f64);

impl VbDate {
    /// 1899-12-30 00:00:00
    pub const ZERO: VbDate = VbDate(0.0);
    /// 0100-01-01 00:00:00
    pub const EARLIEST: VbDate = VbDate(EARLIEST_DAY);
    /// 9999-12-31 23:59:59
    pub const LATEST: VbDate = VbDate(LATEST_DAY + 86_399.0 / SECONDS_PER_DAY);

    /// Build a date from a serial, enforcing the representable range.
    ///
    /// A serial in (-1, 0) names day zero and is stored as its absolute
    /// value. On the latest representable day the time is truncated to whole
    /// seconds.
    pub fn from_serial(serial: f64) -> RuntimeResult<VbDate> {
        if !serial.is_finite() {
            return Err(RuntimeError::overflow("CDate"));
        }
        let serial = if serial > -1.0 && serial < 0.0 {
            -serial
        } else {
            serial
        };

        let day = serial.trunc();
        let fraction = (serial - day).abs();
        if !(EARLIEST_DAY..=LATEST_DAY).contains(&day) {
            return Err(RuntimeError::overflow("CDate"));
        }

        if day == LATEST_DAY {
            if fraction >= LATEST_DAY_FRACTION_LIMIT {
                return Err(RuntimeError::overflow("CDate"));
            }
            let millis = (fraction * MILLIS_PER_DAY).round();
            let seconds = (millis / 1000.0).floor();
            return Ok(VbDate(day + seconds / SECONDS_PER_DAY));
        }

        if day == EARLIEST_DAY && fraction >= EARLIEST_DAY_FRACTION_LIMIT {
            return Err(RuntimeError::overflow("CDate"));
        }

        Ok(VbDate(serial))
    }

    /// Build a date from a linear day count (see module docs)
    pub fn from_linear(linear: f64) -> RuntimeResult<VbDate> {
        if !linear.is_finite() {
            return Err(RuntimeError::overflow("CDate"));
        }
        if linear >= 0.0 {
            return VbDate::from_serial(linear);
        }
        let day = linear.floor();
        let fraction = linear - day;
        VbDate::from_serial(day - fraction)
    }

    /// Build a date from calendar components
    pub fn from_components(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<VbDate> {
        if !(100..=9999).contains(&year) {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        let days = (date - zero_date()?).num_days() as f64;
        let fraction = time.num_seconds_from_midnight() as f64 / SECONDS_PER_DAY;
        let serial = if days >= 0.0 {
            days + fraction
        } else {
            days - fraction
        };
        VbDate::from_serial(serial).ok()
    }

    pub fn serial(self) -> f64 {
        self.0
    }

    /// Serial with the negative-day asymmetry removed, suitable for
    /// addition and subtraction.
    pub fn linear(self) -> f64 {
        if self.0 >= 0.0 {
            return self.0;
        }
        let day = self.0.trunc();
        day + (day - self.0)
    }

    /// Whole-day component of the serial
    pub fn day_number(self) -> i64 {
        self.0.trunc() as i64
    }

    /// Milliseconds since midnight
    pub fn millis_of_day(self) -> u32 {
        let fraction = (self.0 - self.0.trunc()).abs();
        ((fraction * MILLIS_PER_DAY).round() as u32).min(86_399_999)
    }

    /// Calendar view of the value
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        let date = zero_date()?.checked_add_signed(Duration::days(self.day_number()))?;
        let millis = self.millis_of_day();
        let time = NaiveTime::from_num_seconds_from_midnight_opt(
            millis / 1000,
            (millis % 1000) * 1_000_000,
        )?;
        Some(NaiveDateTime::new(date, time))
    }

    /// Render using the culture's component order
    pub fn format(self, order: DateOrder) -> String {
        let Some(moment) = self.to_naive() else {
            return self.0.to_string();
        };
        let date = moment.date();
        let time = moment.time();

        let date_text = match order {
            DateOrder::Mdy => format!("{}/{}/{}", date.month(), date.day(), date.year()),
            DateOrder::Dmy => format!("{:02}/{:02}/{:04}", date.day(), date.month(), date.year()),
            DateOrder::Ymd => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
        };
        let time_text = match order {
            DateOrder::Mdy => {
                let (pm, hour) = time.hour12();
                format!(
                    "{}:{:02}:{:02} {}",
                    hour,
                    time.minute(),
                    time.second(),
                    if pm { "PM" } else { "AM" }
                )
            }
            DateOrder::Dmy | DateOrder::Ymd => format!(
                "{:02}:{:02}:{:02}",
                time.hour(),
                time.minute(),
                time.second()
            ),
        };

        if self.day_number() == 0 {
            time_text
        } else if time.num_seconds_from_midnight() == 0 {
            date_text
        } else {
            format!("{} {}", date_text, time_text)
        }
    }

    /// Parse a date and/or time string.
    ///
    /// `reference_year` supplies the year for strings that omit it.
    pub fn parse(input: &str, order: DateOrder, reference_year: i32) -> Option<VbDate> {
        let tokens = tokenize(input)?;
        let parts = DateParts::collect(&tokens)?;

        let (hour, minute, second) = parts.time_of_day()?;
        let (year, month, day) = match parts.calendar(order, reference_year)? {
            Some(ymd) => ymd,
            None => {
                let fraction =
                    (hour * 3600 + minute * 60 + second) as f64 / SECONDS_PER_DAY;
                return VbDate::from_serial(fraction).ok();
            }
        };
        VbDate::from_components(year, month, day, hour, minute, second)
    }
}

impl fmt::Display for VbDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(DateOrder::Mdy))
    }
}

fn zero_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

// ============================================================================
// Date string parsing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number { value: u32, digits: usize },
    Month(u32),
    Meridiem { pm: bool },
    Colon,
    Separator,
}

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

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.trim().chars().peekable();
    if chars.peek().is_none() {
        return None;
    }

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut text = String::new();
            while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                text.push(d);
                chars.next();
            }
            if text.len() > 9 {
                return None;
            }
            tokens.push(Token::Number {
                value: text.parse().ok()?,
                digits: text.len(),
            });
        } else if c.is_alphabetic() {
            let mut word = String::new();
            while let Some(&l) = chars.peek().filter(|l| l.is_alphabetic()) {
                word.push(l.to_ascii_lowercase());
                chars.next();
            }
            tokens.push(classify_word(&word)?);
        } else if c == ':' {
            tokens.push(Token::Colon);
            chars.next();
        } else if c.is_whitespace() || matches!(c, '/' | '-' | '.' | ',') {
            tokens.push(Token::Separator);
            chars.next();
        } else {
            return None;
        }
    }
    Some(tokens)
}

fn classify_word(word: &str) -> Option<Token> {
    match word {
        "am" | "a" => return Some(Token::Meridiem { pm: false }),
        "pm" | "p" => return Some(Token::Meridiem { pm: true }),
        _ => {}
    }
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(word))
        .map(|index| Token::Month(index as u32 + 1))
}

#[derive(Debug, Default)]
struct DateParts {
    numbers: Vec<(u32, usize)>,
    month_name: Option<u32>,
    time: Option<(u32, u32, u32)>,
    meridiem: Option<bool>,
}

impl DateParts {
    fn collect(tokens: &[Token]) -> Option<DateParts> {
        let mut parts = DateParts::default();
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i] {
                Token::Number { value, digits } => {
                    if tokens.get(i + 1) == Some(&Token::Colon) {
                        if parts.time.is_some() {
                            return None;
                        }
                        let (time, next) = read_clock(tokens, i)?;
                        parts.time = Some(time);
                        i = next;
                        continue;
                    }
                    let next_meaningful = tokens[i + 1..]
                        .iter()
                        .find(|t| **t != Token::Separator);
                    if matches!(next_meaningful, Some(Token::Meridiem { .. })) {
                        if parts.time.is_some() {
                            return None;
                        }
                        parts.time = Some((value, 0, 0));
                    } else {
                        parts.numbers.push((value, digits));
                    }
                }
                Token::Month(month) => {
                    if parts.month_name.replace(month).is_some() {
                        return None;
                    }
                }
                Token::Meridiem { pm } => {
                    if parts.time.is_none() || parts.meridiem.replace(pm).is_some() {
                        return None;
                    }
                }
                Token::Colon => return None,
                Token::Separator => {}
            }
            i += 1;
        }
        Some(parts)
    }

    fn time_of_day(&self) -> Option<(u32, u32, u32)> {
        let (hour, minute, second) = self.time.unwrap_or((0, 0, 0));
        if minute > 59 || second > 59 {
            return None;
        }
        let hour = match self.meridiem {
            Some(pm) => {
                if hour > 12 {
                    return None;
                }
                match (pm, hour) {
                    (false, 12) => 0,
                    (true, h) if h < 12 => h + 12,
                    (_, h) => h,
                }
            }
            None if hour > 23 => return None,
            None => hour,
        };
        Some((hour, minute, second))
    }

    /// Year, month and day; `Some(None)` for time-only input
    fn calendar(&self, order: DateOrder, reference_year: i32) -> Option<Option<(i32, u32, u32)>> {
        let numbers = &self.numbers;
        let resolved = match (self.month_name, numbers.len()) {
            (None, 0) => return self.time.map(|_| None),
            (None, 1) => return None,
            (None, 2) => {
                let (a, b) = (numbers[0], numbers[1]);
                if is_year_like(a) {
                    validate(expand_year(a), b.0, 1)
                } else if is_year_like(b) {
                    validate(expand_year(b), a.0, 1)
                } else {
                    let (month, day) = match order {
                        DateOrder::Dmy => (b.0, a.0),
                        DateOrder::Mdy | DateOrder::Ymd => (a.0, b.0),
                    };
                    validate(reference_year, month, day)
                        .or_else(|| validate(reference_year, day, month))
                }
            }
            (None, 3) => {
                let (a, b, c) = (numbers[0], numbers[1], numbers[2]);
                if is_year_like(a) {
                    let year = expand_year(a);
                    validate(year, b.0, c.0).or_else(|| validate(year, c.0, b.0))
                } else {
                    let (year, month, day) = match order {
                        DateOrder::Mdy => (expand_year(c), a.0, b.0),
                        DateOrder::Dmy => (expand_year(c), b.0, a.0),
                        DateOrder::Ymd => (expand_year(a), b.0, c.0),
                    };
                    validate(year, month, day).or_else(|| validate(year, day, month))
                }
            }
            (Some(month), 1) => {
                let only = numbers[0];
                if is_year_like(only) {
                    validate(expand_year(only), month, 1)
                } else {
                    validate(reference_year, month, only.0)
                }
            }
            (Some(month), 2) => {
                let (a, b) = (numbers[0], numbers[1]);
                if is_year_like(a) && !is_year_like(b) {
                    validate(expand_year(a), month, b.0)
                } else {
                    validate(expand_year(b), month, a.0)
                }
            }
            _ => None,
        };
        resolved.map(Some)
    }
}

/// Read `h:m[:s]` starting at `start`; returns the time and the next index
fn read_clock(tokens: &[Token], start: usize) -> Option<((u32, u32, u32), usize)> {
    let mut fields = Vec::with_capacity(3);
    let mut i = start;
    loop {
        match tokens.get(i) {
            Some(Token::Number { value, .. }) => fields.push(*value),
            _ => return None,
        }
        i += 1;
        if tokens.get(i) == Some(&Token::Colon) && fields.len() < 3 {
            i += 1;
            continue;
        }
        break;
    }
    let time = match fields.as_slice() {
        [h, m] => (*h, *m, 0),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };
    Some((time, i))
}

fn is_year_like((value, digits): (u32, usize)) -> bool {
    digits > 2 || value > 31
}

/// Two-digit years: 00-29 are 2000s, 30-99 are 1900s
fn expand_year((value, digits): (u32, usize)) -> i32 {
    let value = value as i32;
    if digits <= 2 {
        if value < 30 {
            2000 + value
        } else {
            1900 + value
        }
    } else {
        value
    }
}

fn validate(year: i32, month: u32, day: u32) -> Option<(i32, u32, u32)> {
    if !(100..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).map(|_| (year, month, day))
}
