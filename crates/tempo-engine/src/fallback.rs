//! Heuristic date-time parser used once the pattern catalog is exhausted.
//!
//! Unlike the catalog, this parser does not need to know the shape of the
//! input in advance. It first tries the two standard wire formats (RFC 3339
//! and RFC 2822) and then falls back to a token walk that assigns numbers and
//! words to date, clock and offset fields:
//!
//! - `H:M[:S[.frac]]` clocks, optionally followed by `AM`/`PM`
//! - compact `YYYYMMDD[HH[MM[SS]]]` runs
//! - English month names (full or abbreviated); weekday names are ignored
//! - UTC designators (`Z`, `UTC`, `GMT`) and signed offsets after a clock
//!   (`-5`, `+0530`, `-04:00`)
//!
//! Date numbers resolve as year-month-day when the first looks like a year,
//! otherwise month/day/year (day/month/year when the first exceeds 12).
//! A complete calendar date is required; this parser never fills in
//! "today".

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::error::TempoError;
use crate::value::CivilDateTime;

/// Parse free-form date-time text.
///
/// # Errors
///
/// Returns [`TempoError::Parse`] if no complete date can be assembled from
/// the text or a field is out of range.
///
/// # Examples
///
/// ```
/// use tempo_engine::fallback::parse_heuristic;
///
/// let dt = parse_heuristic("2000-01-01T00:00:00-5").unwrap();
/// assert_eq!(dt.offset().map(|o| o.local_minus_utc()), Some(-5 * 3600));
/// ```
pub fn parse_heuristic(text: &str) -> Result<CivilDateTime, TempoError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TempoError::Parse("empty date-time string".to_string()));
    }

    try_passthrough_rfc3339(trimmed)
        .or_else(|| try_passthrough_rfc2822(trimmed))
        .map(Ok)
        .unwrap_or_else(|| parse_tokens(trimmed))
        .map_err(|reason| match reason {
            TempoError::Parse(reason) => {
                TempoError::Parse(format!("unable to parse date-time from '{trimmed}': {reason}"))
            }
            other => other,
        })
}

fn try_passthrough_rfc3339(s: &str) -> Option<CivilDateTime> {
    DateTime::parse_from_rfc3339(s).ok().map(CivilDateTime::from)
}

fn try_passthrough_rfc2822(s: &str) -> Option<CivilDateTime> {
    DateTime::parse_from_rfc2822(s).ok().map(CivilDateTime::from)
}

// ── Tokenizer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Word(&'a str),
    Sep(char),
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = s;
    while let Some(ch) = rest.chars().next() {
        if ch.is_ascii_digit() {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            tokens.push(Token::Number(&rest[..end]));
            rest = &rest[end..];
        } else if ch.is_alphabetic() {
            let end = rest
                .find(|c: char| !c.is_alphabetic())
                .unwrap_or(rest.len());
            tokens.push(Token::Word(&rest[..end]));
            rest = &rest[end..];
        } else {
            // Runs of whitespace and commas collapse into one blank.
            if ch.is_whitespace() || ch == ',' {
                if tokens.last() != Some(&Token::Sep(' ')) {
                    tokens.push(Token::Sep(' '));
                }
            } else {
                tokens.push(Token::Sep(ch));
            }
            rest = &rest[ch.len_utf8()..];
        }
    }
    tokens
}

// ── Field assembly ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Fields<'a> {
    date_numbers: Vec<&'a str>,
    month_name: Option<u32>,
    compact_date: Option<(i32, u32, u32)>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    nanosecond: Option<u32>,
    meridiem: Option<Meridiem>,
    offset_seconds: Option<i32>,
    // A sign only introduces an offset right after a clock.
    offset_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

fn parse_tokens(s: &str) -> Result<CivilDateTime, TempoError> {
    let tokens = tokenize(s);
    let mut fields = Fields::default();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            Token::Number(n) => {
                i = consume_number(&tokens, i, n, &mut fields)?;
            }
            Token::Word(w) => {
                consume_word(w, &mut fields)?;
                i += 1;
            }
            Token::Sep(sign @ ('+' | '-')) if fields.offset_ready => {
                i = consume_offset(&tokens, i + 1, sign, &mut fields)?;
            }
            Token::Sep(' ' | '-' | '/' | '.') => i += 1,
            Token::Sep(other) => {
                return Err(TempoError::Parse(format!("unexpected character '{other}'")));
            }
        }
    }

    assemble(&fields)
}

fn number(s: &str) -> Result<u32, TempoError> {
    s.parse::<u32>()
        .map_err(|_| TempoError::Parse(format!("number out of range: '{s}'")))
}

fn consume_number<'a>(
    tokens: &[Token<'a>],
    i: usize,
    n: &'a str,
    fields: &mut Fields<'a>,
) -> Result<usize, TempoError> {
    // Clock: H:M[:S[.frac]]
    if tokens.get(i + 1) == Some(&Token::Sep(':')) && fields.hour.is_none() {
        return consume_clock(tokens, i, fields);
    }

    // Compact runs: YYYYMMDD, YYYYMMDDHH, YYYYMMDDHHMM, YYYYMMDDHHMMSS[.frac]
    if matches!(n.len(), 8 | 10 | 12 | 14) && fields.compact_date.is_none() {
        let year = number(&n[0..4])? as i32;
        fields.compact_date = Some((year, number(&n[4..6])?, number(&n[6..8])?));
        if n.len() >= 10 {
            fields.hour = Some(number(&n[8..10])?);
            fields.minute = Some(0);
            fields.offset_ready = true;
        }
        if n.len() >= 12 {
            fields.minute = Some(number(&n[10..12])?);
        }
        if n.len() == 14 {
            fields.second = Some(number(&n[12..14])?);
            if let (Some(Token::Sep('.')), Some(Token::Number(frac))) =
                (tokens.get(i + 1), tokens.get(i + 2))
            {
                fields.nanosecond = Some(fraction_to_nanos(frac)?);
                return Ok(i + 3);
            }
        }
        return Ok(i + 1);
    }

    // Bare hour followed by a meridiem: "5 PM", "5pm"
    let next_word = match (tokens.get(i + 1), tokens.get(i + 2)) {
        (Some(Token::Word(w)), _) | (Some(Token::Sep(' ')), Some(Token::Word(w))) => Some(*w),
        _ => None,
    };
    if fields.hour.is_none() && next_word.is_some_and(|w| meridiem(w).is_some()) {
        fields.hour = Some(number(n)?);
        fields.minute = Some(0);
        return Ok(i + 1);
    }

    fields.date_numbers.push(n);
    fields.offset_ready = false;
    Ok(i + 1)
}

fn consume_clock(tokens: &[Token<'_>], i: usize, fields: &mut Fields<'_>) -> Result<usize, TempoError> {
    let mut parts = Vec::with_capacity(3);
    let mut j = i;
    while let Some(Token::Number(n)) = tokens.get(j) {
        parts.push(number(n)?);
        if parts.len() == 3 || tokens.get(j + 1) != Some(&Token::Sep(':')) {
            j += 1;
            break;
        }
        j += 2;
    }
    if parts.len() < 2 {
        return Err(TempoError::Parse("incomplete clock".to_string()));
    }
    fields.hour = Some(parts[0]);
    fields.minute = Some(parts[1]);
    fields.second = parts.get(2).copied();
    fields.offset_ready = true;

    if parts.len() == 3 {
        if let (Some(Token::Sep('.')), Some(Token::Number(frac))) = (tokens.get(j), tokens.get(j + 1)) {
            fields.nanosecond = Some(fraction_to_nanos(frac)?);
            j += 2;
        }
    }
    Ok(j)
}

fn consume_offset(
    tokens: &[Token<'_>],
    i: usize,
    sign: char,
    fields: &mut Fields<'_>,
) -> Result<usize, TempoError> {
    let Some(Token::Number(n)) = tokens.get(i) else {
        return Err(TempoError::Parse(format!("dangling '{sign}'")));
    };
    let (hours, minutes, next) = match n.len() {
        1 | 2 => match (tokens.get(i + 1), tokens.get(i + 2)) {
            (Some(Token::Sep(':')), Some(Token::Number(m))) => (number(n)?, number(m)?, i + 3),
            _ => (number(n)?, 0, i + 1),
        },
        4 => (number(&n[..2])?, number(&n[2..])?, i + 1),
        _ => return Err(TempoError::Parse(format!("malformed UTC offset '{sign}{n}'"))),
    };
    if hours > 23 || minutes > 59 {
        return Err(TempoError::Parse(format!("UTC offset out of range '{sign}{n}'")));
    }
    let magnitude = (hours * 3600 + minutes * 60) as i32;
    fields.offset_seconds = Some(if sign == '-' { -magnitude } else { magnitude });
    Ok(next)
}

fn consume_word(word: &str, fields: &mut Fields<'_>) -> Result<(), TempoError> {
    let lower = word.to_lowercase();
    if let Some(month) = parse_month(&lower) {
        if fields.month_name.replace(month).is_some() {
            return Err(TempoError::Parse("more than one month name".to_string()));
        }
        fields.offset_ready = false;
        return Ok(());
    }
    if let Some(m) = meridiem(&lower) {
        fields.meridiem = Some(m);
        fields.offset_ready = fields.hour.is_some();
        return Ok(());
    }
    if is_utc_designator(&lower) {
        fields.offset_seconds.get_or_insert(0);
        return Ok(());
    }
    if is_weekday_name(&lower) || matches!(lower.as_str(), "t" | "at" | "on" | "of") {
        return Ok(());
    }
    Err(TempoError::Parse(format!("unknown word '{word}'")))
}

fn assemble(fields: &Fields<'_>) -> Result<CivilDateTime, TempoError> {
    let (year, month, day) = match fields.compact_date {
        Some(ymd) if fields.date_numbers.is_empty() && fields.month_name.is_none() => ymd,
        Some(_) => return Err(TempoError::Parse("conflicting date fields".to_string())),
        None => resolve_date(&fields.date_numbers, fields.month_name)?,
    };
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        TempoError::Parse(format!("{year:04}-{month:02}-{day:02} is not a valid date"))
    })?;

    let hour = match (fields.hour, fields.meridiem) {
        (None, Some(_)) => return Err(TempoError::Parse("AM/PM without an hour".to_string())),
        (None, None) => 0,
        (Some(h), None) => h,
        (Some(h), Some(_)) if h == 0 || h > 12 => {
            return Err(TempoError::Parse(format!("hour {h} is not a 12-hour clock value")));
        }
        (Some(12), Some(Meridiem::Am)) => 0,
        (Some(12), Some(Meridiem::Pm)) => 12,
        (Some(h), Some(Meridiem::Am)) => h,
        (Some(h), Some(Meridiem::Pm)) => h + 12,
    };
    let time = NaiveTime::from_hms_nano_opt(
        hour,
        fields.minute.unwrap_or(0),
        fields.second.unwrap_or(0),
        fields.nanosecond.unwrap_or(0),
    )
    .ok_or_else(|| TempoError::Parse("clock out of range".to_string()))?;

    let datetime = date.and_time(time);
    match fields.offset_seconds {
        Some(seconds) => {
            let offset = FixedOffset::east_opt(seconds)
                .ok_or_else(|| TempoError::Parse("UTC offset out of range".to_string()))?;
            Ok(CivilDateTime::aware(datetime, offset))
        }
        None => Ok(CivilDateTime::naive(datetime)),
    }
}

/// Order the loose date numbers into (year, month, day).
fn resolve_date(numbers: &[&str], month_name: Option<u32>) -> Result<(i32, u32, u32), TempoError> {
    match (month_name, numbers) {
        (Some(month), [a, b]) => {
            // "Sep 20, 2014", "20 September 2014", "2014 Sep 20"
            if looks_like_year(a) {
                Ok((expand_year(a)?, month, number(b)?))
            } else {
                Ok((expand_year(b)?, month, number(a)?))
            }
        }
        (None, [a, b, c]) => {
            if looks_like_year(a) {
                Ok((expand_year(a)?, number(b)?, number(c)?))
            } else {
                let (first, second) = (number(a)?, number(b)?);
                if first > 12 && second <= 12 {
                    Ok((expand_year(c)?, second, first))
                } else {
                    Ok((expand_year(c)?, first, second))
                }
            }
        }
        _ => Err(TempoError::Parse("no complete calendar date".to_string())),
    }
}

fn looks_like_year(s: &str) -> bool {
    s.len() >= 3 || s.parse::<u32>().is_ok_and(|v| v > 31)
}

/// Four-digit years pass through; two-digit years pivot at 69.
fn expand_year(s: &str) -> Result<i32, TempoError> {
    let value = number(s)? as i32;
    match s.len() {
        1 | 2 if value < 69 => Ok(2000 + value),
        1 | 2 => Ok(1900 + value),
        _ => Ok(value),
    }
}

fn fraction_to_nanos(digits: &str) -> Result<u32, TempoError> {
    let padded: String = digits.chars().chain(std::iter::repeat('0')).take(9).collect();
    number(&padded)
}

fn meridiem(word: &str) -> Option<Meridiem> {
    match word.to_lowercase().as_str() {
        "am" | "a" => Some(Meridiem::Am),
        "pm" | "p" => Some(Meridiem::Pm),
        _ => None,
    }
}

fn is_utc_designator(word: &str) -> bool {
    matches!(word, "z" | "utc" | "gmt" | "ut")
        || word.strip_prefix('z').is_some_and(|rest| matches!(rest, "utc" | "gmt"))
}

/// Parse a month name to number (1-12).
fn parse_month(s: &str) -> Option<u32> {
    match s {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

fn is_weekday_name(s: &str) -> bool {
    matches!(
        s,
        "monday"
            | "mon"
            | "tuesday"
            | "tue"
            | "tues"
            | "wednesday"
            | "wed"
            | "thursday"
            | "thu"
            | "thurs"
            | "friday"
            | "fri"
            | "saturday"
            | "sat"
            | "sunday"
            | "sun"
    )
}
