//! The ordered pattern catalog.
//!
//! Each entry pairs a strftime format with a canonical example of the text it
//! accepts. The order of both lists is part of the observable contract: on
//! ambiguous input the lowest-index pattern wins, so reordering entries is a
//! breaking change.
//!
//! Matching is strict and walks the format's [`StrftimeItems`] directly:
//!
//! - `%Y` takes exactly four digits and `%y` exactly two (`< 69` is 20xx).
//! - `%m`, `%d`, `%H`, `%I`, `%M` and `%S` take one or two digits, longest
//!   first, and only values in range.
//! - `%B`/`%A` take full English names only, `%b`/`%a` three-letter ones.
//! - A space in the format takes one or more whitespace characters.
//! - `%.f` is a dot and one to six digits, `%Z` is `UTC` or `GMT`, `%z` is
//!   `±HHMM`, `±HH:MM` or `Z`.
//!
//! Letters compare case-insensitively. The first way through the format wins;
//! if it leaves text over, the pattern does not match.

use chrono::format::{Fixed, Item, Numeric, StrftimeItems};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Weekday};

use crate::value::{CalendarDate, CivilDateTime};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

/// Which fields a pattern produces, and therefore how a match is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Calendar date only; date-time matches land on midnight.
    Date,
    /// Date plus an hour with no minute field; minutes default to zero.
    DateHour,
    /// Zone-naive date and time.
    DateTime,
    /// Date and time with a numeric UTC offset.
    Zoned,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub format: &'static str,
    pub example: &'static str,
    pub shape: Shape,
}

impl Pattern {
    const fn new(format: &'static str, example: &'static str, shape: Shape) -> Self {
        Self {
            format,
            example,
            shape,
        }
    }

    /// Match the whole of `text` as a calendar date.
    ///
    /// Only date-shaped patterns can produce a date; a partial match (text
    /// left over) or a calendrically invalid result is a rejection.
    pub fn match_date(&self, text: &str) -> Option<CalendarDate> {
        match self.shape {
            Shape::Date => scan(self.format, text)?.date(),
            _ => None,
        }
    }

    /// Match the whole of `text` as a date-time.
    pub fn match_datetime(&self, text: &str) -> Option<CivilDateTime> {
        let fields = scan(self.format, text)?;
        let date = fields.date()?;
        match self.shape {
            Shape::Date => Some(CivilDateTime::midnight(date)),
            Shape::DateHour | Shape::DateTime => {
                Some(CivilDateTime::naive(date.and_time(fields.time()?)))
            }
            Shape::Zoned => {
                let offset = FixedOffset::east_opt(fields.offset?)?;
                Some(CivilDateTime::aware(date.and_time(fields.time()?), offset))
            }
        }
    }
}

// ── Strict scanner ──────────────────────────────────────────────────────

/// Raw field values picked out of the text, before calendar validation.
#[derive(Debug, Clone, Copy, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    hour12: Option<u32>,
    pm: Option<bool>,
    minute: Option<u32>,
    second: Option<u32>,
    nanosecond: Option<u32>,
    weekday: Option<Weekday>,
    offset: Option<i32>,
}

impl Fields {
    fn date(&self) -> Option<NaiveDate> {
        let year = self.year.filter(|year| *year >= 1)?;
        let date = NaiveDate::from_ymd_opt(year, self.month?, self.day?)?;
        match self.weekday {
            Some(weekday) if date.weekday() != weekday => None,
            _ => Some(date),
        }
    }

    fn time(&self) -> Option<NaiveTime> {
        let hour = match (self.hour, self.hour12) {
            (Some(hour), _) => hour,
            (None, Some(hour12)) => hour12 % 12 + if self.pm == Some(true) { 12 } else { 0 },
            (None, None) => 0,
        };
        NaiveTime::from_hms_nano_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanosecond.unwrap_or(0),
        )
    }
}

/// Fields of `text` under `format`, if the first way through the format
/// consumes the whole text.
fn scan(format: &str, text: &str) -> Option<Fields> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    let (fields, rest) = walk(&items, text, Fields::default())?;
    rest.is_empty().then_some(fields)
}

fn walk<'t>(items: &[Item<'_>], text: &'t str, fields: Fields) -> Option<(Fields, &'t str)> {
    let Some((item, remaining)) = items.split_first() else {
        return Some((fields, text));
    };
    match item {
        Item::Literal(literal) => walk(remaining, strip_prefix_ignore_case(text, literal)?, fields),
        Item::Space(_) => {
            let trimmed = text.trim_start();
            if trimmed.len() == text.len() {
                return None;
            }
            walk(remaining, trimmed, fields)
        }
        Item::Numeric(numeric, _) => {
            let (min_width, max_width, low, high) = numeric_rule(numeric)?;
            (min_width..=max_width).rev().find_map(|width| {
                let digits = text.get(..width).filter(|d| d.bytes().all(|b| b.is_ascii_digit()))?;
                let value: u32 = digits.parse().ok()?;
                if value < low || value > high {
                    return None;
                }
                walk(remaining, &text[width..], with_numeric(fields, numeric, value))
            })
        }
        Item::Fixed(fixed) => fixed_candidates(fixed, text, fields)
            .into_iter()
            .find_map(|(fields, rest)| walk(remaining, rest, fields)),
        _ => None,
    }
}

/// Width range and value range for each numeric field.
fn numeric_rule(numeric: &Numeric) -> Option<(usize, usize, u32, u32)> {
    match numeric {
        Numeric::Year => Some((4, 4, 0, 9999)),
        Numeric::YearMod100 => Some((2, 2, 0, 99)),
        Numeric::Month => Some((1, 2, 1, 12)),
        Numeric::Day => Some((1, 2, 1, 31)),
        Numeric::Hour => Some((1, 2, 0, 23)),
        Numeric::Hour12 => Some((1, 2, 1, 12)),
        Numeric::Minute => Some((1, 2, 0, 59)),
        Numeric::Second => Some((1, 2, 0, 61)),
        _ => None,
    }
}

fn with_numeric(mut fields: Fields, numeric: &Numeric, value: u32) -> Fields {
    match numeric {
        Numeric::Year => fields.year = i32::try_from(value).ok(),
        Numeric::YearMod100 => {
            let century = if value < 69 { 2000 } else { 1900 };
            fields.year = i32::try_from(value).ok().map(|yy| century + yy);
        }
        Numeric::Month => fields.month = Some(value),
        Numeric::Day => fields.day = Some(value),
        Numeric::Hour => fields.hour = Some(value),
        Numeric::Hour12 => fields.hour12 = Some(value),
        Numeric::Minute => fields.minute = Some(value),
        Numeric::Second => fields.second = Some(value),
        _ => {}
    }
    fields
}

/// Every way a fixed item can start `text`, in preference order.
fn fixed_candidates<'t>(fixed: &Fixed, text: &'t str, fields: Fields) -> Vec<(Fields, &'t str)> {
    match fixed {
        Fixed::LongMonthName | Fixed::ShortMonthName => {
            let short = matches!(fixed, Fixed::ShortMonthName);
            MONTH_NAMES
                .iter()
                .zip(1..)
                .filter_map(|(name, month)| {
                    let name: &str = if short { &name[..3] } else { name };
                    let rest = strip_prefix_ignore_case(text, name)?;
                    Some((Fields { month: Some(month), ..fields }, rest))
                })
                .collect()
        }
        Fixed::LongWeekdayName | Fixed::ShortWeekdayName => {
            let short = matches!(fixed, Fixed::ShortWeekdayName);
            WEEKDAY_NAMES
                .iter()
                .filter_map(|(name, weekday)| {
                    let name: &str = if short { &name[..3] } else { name };
                    let rest = strip_prefix_ignore_case(text, name)?;
                    Some((Fields { weekday: Some(*weekday), ..fields }, rest))
                })
                .collect()
        }
        Fixed::UpperAmPm | Fixed::LowerAmPm => [("am", false), ("pm", true)]
            .iter()
            .filter_map(|(marker, pm)| {
                let rest = strip_prefix_ignore_case(text, marker)?;
                Some((Fields { pm: Some(*pm), ..fields }, rest))
            })
            .collect(),
        Fixed::Nanosecond => {
            let Some(after_dot) = text.strip_prefix('.') else {
                return Vec::new();
            };
            let run = after_dot.bytes().take_while(u8::is_ascii_digit).count().min(6);
            (1..=run)
                .rev()
                .filter_map(|width| {
                    let digits = &after_dot[..width];
                    let nanos = format!("{digits:0<9}").parse().ok()?;
                    Some((Fields { nanosecond: Some(nanos), ..fields }, &after_dot[width..]))
                })
                .collect()
        }
        Fixed::TimezoneName => ["UTC", "GMT"]
            .iter()
            .filter_map(|name| Some((fields, strip_prefix_ignore_case(text, name)?)))
            .collect(),
        Fixed::TimezoneOffset => parse_offset(text)
            .map(|(seconds, rest)| (Fields { offset: Some(seconds), ..fields }, rest))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// `±HHMM`, `±HH:MM` or a bare `Z`.
fn parse_offset(text: &str) -> Option<(i32, &str)> {
    if let Some(rest) = text.strip_prefix('Z') {
        return Some((0, rest));
    }
    let sign = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours = two_digits(text.get(1..3)?)?;
    let rest = &text[3..];
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let minutes = two_digits(rest.get(..2)?).filter(|m| *m < 60)?;
    Some((sign * (hours * 3600 + minutes * 60), &rest[2..]))
}

fn two_digits(s: &str) -> Option<i32> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn strip_prefix_ignore_case<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

const DATE_PATTERN_COUNT: usize = 14;
const DATETIME_PATTERN_COUNT: usize = 45;

/// Date-only patterns, in precedence order.
pub static DATE_PATTERNS: [Pattern; DATE_PATTERN_COUNT] = [
    // Dash delimiter
    Pattern::new("%Y-%m-%d", "2014-09-20", Shape::Date),
    Pattern::new("%m-%d-%Y", "09-20-2014", Shape::Date),
    // Slash delimiter
    Pattern::new("%Y/%m/%d", "2014/09/20", Shape::Date),
    Pattern::new("%m/%d/%Y", "09/20/2014", Shape::Date),
    // Dot delimiter
    Pattern::new("%Y.%m.%d", "2014.09.20", Shape::Date),
    Pattern::new("%m.%d.%Y", "9.20.2014", Shape::Date),
    // Long date
    Pattern::new("%B %d, %Y", "September 20, 2014", Shape::Date),
    Pattern::new("%A, %B %d, %Y", "Saturday, September 20, 2014", Shape::Date),
    Pattern::new("%b %d, %Y", "Sep 20, 2014", Shape::Date),
    Pattern::new("%a, %b %d, %Y", "Sat, Sep 20, 2014", Shape::Date),
    // No delimiter
    Pattern::new("%Y%m%d", "20140920", Shape::Date),
    Pattern::new("%y%m%d", "140920", Shape::Date),
    Pattern::new("%m%d%Y", "09202014", Shape::Date),
    Pattern::new("%m%d%y", "092010", Shape::Date),
];

/// Date-time patterns, in precedence order. The date-time cascade continues
/// into [`DATE_PATTERNS`] after the last of these (see [`datetime_pattern`]).
pub static DATETIME_PATTERNS: [Pattern; DATETIME_PATTERN_COUNT] = [
    // Dash delimiter, year first
    Pattern::new("%Y-%m-%d %H:%M:%S", "2014-01-15 17:58:31", Shape::DateTime),
    Pattern::new("%Y-%m-%d %H:%M:%S%.f", "2014-01-15 17:58:31.1234", Shape::DateTime),
    Pattern::new("%Y-%m-%d %H:%M", "2014-01-15 17:58", Shape::DateTime),
    Pattern::new("%Y-%m-%d %I:%M:%S %p", "2014-01-15 5:58:31 PM", Shape::DateTime),
    Pattern::new("%Y-%m-%d %I:%M %p", "2014-01-15 05:58 PM", Shape::DateTime),
    Pattern::new("%Y-%m-%d %I %p", "2014-01-15 05 PM", Shape::DateHour),
    // Dash delimiter, month first
    Pattern::new("%m-%d-%Y %H:%M:%S", "1-15-2014 17:58:31", Shape::DateTime),
    Pattern::new("%m-%d-%Y %H:%M:%S%.f", "1-15-2014 17:58:31.1234", Shape::DateTime),
    Pattern::new("%m-%d-%Y %H:%M", "1-15-2014 17:58", Shape::DateTime),
    Pattern::new("%m-%d-%Y %I:%M:%S %p", "1-15-2014 5:58:31 PM", Shape::DateTime),
    Pattern::new("%m-%d-%Y %I:%M %p", "1-15-2014 05:58 PM", Shape::DateTime),
    Pattern::new("%m-%d-%Y %I %p", "1-15-2014 05 PM", Shape::DateHour),
    // Slash delimiter, year first
    Pattern::new("%Y/%m/%d %H:%M:%S", "2014/01/15 17:58:31", Shape::DateTime),
    Pattern::new("%Y/%m/%d %H:%M:%S%.f", "2014/01/15 17:58:31.1234", Shape::DateTime),
    Pattern::new("%Y/%m/%d %H:%M", "2014/01/15 17:58", Shape::DateTime),
    Pattern::new("%Y/%m/%d %I:%M:%S %p", "2014/01/15 5:58:31 PM", Shape::DateTime),
    Pattern::new("%Y/%m/%d %I:%M %p", "2014/01/15 05:58 PM", Shape::DateTime),
    Pattern::new("%Y/%m/%d %I %p", "2014/01/15 05 PM", Shape::DateHour),
    // Slash delimiter, month first
    Pattern::new("%m/%d/%Y %H:%M:%S", "1/15/2014 17:58:31", Shape::DateTime),
    Pattern::new("%m/%d/%Y %H:%M:%S%.f", "1/15/2014 17:58:31.1234", Shape::DateTime),
    Pattern::new("%m/%d/%Y %H:%M", "1/15/2014 17:58", Shape::DateTime),
    Pattern::new("%m/%d/%Y %I:%M:%S %p", "1/15/2014 5:58:31 PM", Shape::DateTime),
    Pattern::new("%m/%d/%Y %I:%M %p", "1/15/2014 05:58 PM", Shape::DateTime),
    Pattern::new("%m/%d/%Y %I %p", "1/15/2014 05 PM", Shape::DateHour),
    // Time first
    Pattern::new("%H:%M:%S %m/%d/%Y", "17:58:31 1/15/2014", Shape::DateTime),
    Pattern::new("%H:%M:%S%.f %m/%d/%Y", "17:58:31.1234 1/15/2014", Shape::DateTime),
    Pattern::new("%H:%M %m/%d/%Y", "17:58 1/15/2014", Shape::DateTime),
    Pattern::new("%I:%M:%S %p %m/%d/%Y", "5:58:31 PM 1/15/2014", Shape::DateTime),
    Pattern::new("%I:%M %p %m/%d/%Y", "05:58 PM 1/15/2014", Shape::DateTime),
    Pattern::new("%I %p %m/%d/%Y", "05 PM 1/15/2014", Shape::DateHour),
    // No delimiter, four-digit year
    Pattern::new("%Y%m%d%H", "2014011506", Shape::DateHour),
    Pattern::new("%Y%m%d%H%M", "201401150630", Shape::DateTime),
    Pattern::new("%Y%m%d%H%M%S", "20140115063015", Shape::DateTime),
    Pattern::new("%Y%m%d%H%M%S%.f", "20140115063015.123", Shape::DateTime),
    // No delimiter, two-digit year
    Pattern::new("%y%m%d%H", "14123006", Shape::DateHour),
    Pattern::new("%y%m%d%H%M", "1412300630", Shape::DateTime),
    Pattern::new("%y%m%d%H%M%S", "141230063015", Shape::DateTime),
    Pattern::new("%y%m%d%H%M%S%.f", "141230063015.123", Shape::DateTime),
    // ISO 8601
    Pattern::new("%Y-%m-%dT%H:%M:%S", "2014-01-15T17:58:31", Shape::DateTime),
    Pattern::new("%Y-%m-%dT%H:%M:%S%.f", "2014-01-15T17:58:31.1234", Shape::DateTime),
    Pattern::new("%Y-%m-%dT%H:%M:%SZ%Z", "2014-01-15T17:58:31ZUTC", Shape::DateTime),
    Pattern::new("%Y-%m-%dT%H:%M:%S%.fZ%Z", "2014-01-15T17:58:31.1234ZUTC", Shape::DateTime),
    // RFC 1123
    Pattern::new("%a, %d %b %Y %H:%M:%S GMT", "Wed, 15 Jan 2014 17:58:31 GMT", Shape::DateTime),
    // ISO 8601 with numeric offset
    Pattern::new("%Y-%m-%dT%H:%M:%SZ%z", "2014-01-15T17:58:31Z-0400", Shape::Zoned),
    Pattern::new("%Y-%m-%dT%H:%M:%S%.fZ%z", "2014-01-15T17:58:31.1234Z-0400", Shape::Zoned),
];

/// Number of entries the date-time cascade walks: every date-time pattern,
/// then every date pattern.
pub const DATETIME_CATALOG_LEN: usize = DATETIME_PATTERN_COUNT + DATE_PATTERN_COUNT;

/// The `index`-th entry of the date-time cascade.
pub fn datetime_pattern(index: usize) -> Option<&'static Pattern> {
    DATETIME_PATTERNS
        .get(index)
        .or_else(|| DATE_PATTERNS.get(index.checked_sub(DATETIME_PATTERNS.len())?))
}

/// The date-time cascade in precedence order, with indices.
pub fn datetime_catalog() -> impl Iterator<Item = (usize, &'static Pattern)> {
    DATETIME_PATTERNS.iter().chain(DATE_PATTERNS.iter()).enumerate()
}
