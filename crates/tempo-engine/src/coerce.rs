//! Lazy normalization of loosely-typed input into calendar values.
//!
//! [`TimeInput`] is the closed set of input kinds the toolkit accepts. Callers
//! rarely build it by hand: every supported kind converts with `.into()`, and
//! `None` of any of them becomes [`TimeInput::Missing`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::epoch::{from_epoch_offset, from_ordinal};
use crate::error::TempoError;
use crate::parser::CascadeParser;
use crate::value::{CalendarDate, CivilDateTime};

/// Any input the coercion layer knows how to read.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeInput {
    /// Parsed by the cascade parser.
    Text(String),
    /// A day ordinal for dates, an epoch offset in seconds for date-times.
    Integer(i64),
    /// An epoch offset in seconds. Not accepted where a date is wanted.
    Real(f64),
    CalendarDate(CalendarDate),
    CivilDateTime(CivilDateTime),
    Missing,
}

impl TimeInput {
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real number",
            Self::CalendarDate(_) => "calendar date",
            Self::CivilDateTime(_) => "date-time",
            Self::Missing => "missing value",
        }
    }
}

impl From<&str> for TimeInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for TimeInput {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<i64> for TimeInput {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for TimeInput {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for TimeInput {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for TimeInput {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<NaiveDate> for TimeInput {
    fn from(date: NaiveDate) -> Self {
        Self::CalendarDate(date)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(dt: NaiveDateTime) -> Self {
        Self::CivilDateTime(CivilDateTime::naive(dt))
    }
}

impl From<CivilDateTime> for TimeInput {
    fn from(dt: CivilDateTime) -> Self {
        Self::CivilDateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::CivilDateTime(dt.into())
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::CivilDateTime(dt.into())
    }
}

impl<T: Into<TimeInput>> From<Option<T>> for TimeInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

impl CascadeParser {
    /// Normalize `value` into a calendar date.
    ///
    /// Text goes through [`parse_date`](Self::parse_date), integers are day
    /// ordinals (`730120` is 2000-01-01) and date-times lose their time of
    /// day.
    ///
    /// # Errors
    ///
    /// - [`TempoError::Parse`] for text no date pattern matches.
    /// - [`TempoError::Value`] for an ordinal outside the supported range.
    /// - [`TempoError::Type`] for a missing value or a real number.
    pub fn coerce_to_date(&mut self, value: impl Into<TimeInput>) -> Result<CalendarDate, TempoError> {
        match value.into() {
            TimeInput::Text(text) => self.parse_date(&text),
            TimeInput::Integer(ordinal) => from_ordinal(ordinal),
            TimeInput::CalendarDate(date) => Ok(date),
            TimeInput::CivilDateTime(dt) => Ok(dt.date()),
            other @ (TimeInput::Real(_) | TimeInput::Missing) => Err(TempoError::Type(format!(
                "cannot read a date from a {}",
                other.kind()
            ))),
        }
    }

    /// Normalize `value` into a date-time.
    ///
    /// Text goes through [`parse_datetime`](Self::parse_datetime), numbers
    /// are epoch offsets (zone-naive UTC result) and dates land on midnight.
    ///
    /// # Errors
    ///
    /// - [`TempoError::Parse`] for text nothing can interpret.
    /// - [`TempoError::Value`] for an epoch offset outside the supported range.
    /// - [`TempoError::Type`] for a missing value.
    pub fn coerce_to_datetime(
        &mut self,
        value: impl Into<TimeInput>,
    ) -> Result<CivilDateTime, TempoError> {
        match value.into() {
            TimeInput::Text(text) => self.parse_datetime(&text),
            TimeInput::Integer(seconds) => from_epoch_offset(seconds as f64),
            TimeInput::Real(seconds) => from_epoch_offset(seconds),
            TimeInput::CalendarDate(date) => Ok(CivilDateTime::midnight(date)),
            TimeInput::CivilDateTime(dt) => Ok(dt),
            TimeInput::Missing => Err(TempoError::Type(
                "cannot read a date-time from a missing value".to_string(),
            )),
        }
    }
}
