//! Structured calendar values.
//!
//! A [`CalendarDate`] is a plain Gregorian day. A [`CivilDateTime`] is a
//! wall-clock reading plus an *optional* UTC offset. The optional offset is
//! load-bearing: zone-naive values are interpreted as UTC by the epoch
//! converter and as machine-local time by the legacy local-timestamp pair, so
//! the two shapes are kept apart explicitly instead of being inferred.

use std::cmp::Ordering;
use std::fmt;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, Utc,
};

use crate::error::TempoError;

/// A Gregorian calendar day without a time of day.
pub type CalendarDate = NaiveDate;

/// A wall-clock date and time with an optional fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilDateTime {
    datetime: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl CivilDateTime {
    /// A zone-naive value.
    pub fn naive(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            offset: None,
        }
    }

    /// A zone-aware value: `datetime` is the wall clock at `offset`.
    pub fn aware(datetime: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            datetime,
            offset: Some(offset),
        }
    }

    /// Build a zone-naive value from calendar fields.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::Value`] if the fields do not form a valid
    /// Gregorian date and time.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, TempoError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(Self::naive)
            .ok_or_else(|| {
                TempoError::Value(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} is not a valid date-time"
                ))
            })
    }

    /// Midnight at the start of `date`, zone-naive.
    pub fn midnight(date: CalendarDate) -> Self {
        Self::naive(date.and_time(NaiveTime::MIN))
    }

    /// The wall-clock reading.
    pub fn naive_local(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub fn is_aware(&self) -> bool {
        self.offset.is_some()
    }

    pub fn date(&self) -> CalendarDate {
        self.datetime.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.datetime.time()
    }

    /// The same instant as a UTC wall clock. Zone-naive values are assumed to
    /// already be UTC.
    pub fn utc_naive(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => self.datetime - offset,
            None => self.datetime,
        }
    }

    /// Replace the wall clock, keeping the offset (or its absence).
    pub fn with_wall_clock(&self, datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            offset: self.offset,
        }
    }

    /// Truncate to midnight of the value's own day.
    pub fn at_midnight(&self) -> Self {
        self.with_wall_clock(self.date().and_time(NaiveTime::MIN))
    }

    /// Add an exact duration, `None` on overflow.
    pub fn checked_add(&self, delta: TimeDelta) -> Option<Self> {
        self.datetime
            .checked_add_signed(delta)
            .map(|datetime| self.with_wall_clock(datetime))
    }

    /// Order two values by the instant they denote (naive values as UTC).
    pub fn cmp_instant(&self, other: &Self) -> Ordering {
        self.utc_naive().cmp(&other.utc_naive())
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%d %H:%M:%S%.f"))?;
        if let Some(offset) = self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

impl From<NaiveDateTime> for CivilDateTime {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::naive(datetime)
    }
}

impl From<DateTime<FixedOffset>> for CivilDateTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::aware(dt.naive_local(), *dt.offset())
    }
}

impl From<DateTime<Utc>> for CivilDateTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::aware(dt.naive_utc(), dt.offset().fix())
    }
}

/// Saturday or Sunday (ISO weekday 6 or 7).
pub fn is_weekend<D: Datelike>(value: &D) -> bool {
    value.weekday().number_from_monday() >= 6
}

/// Monday through Friday.
pub fn is_weekday<D: Datelike>(value: &D) -> bool {
    !is_weekend(value)
}
