//! Calendar-safe addition.
//!
//! Seconds through weeks are exact durations. Months and years are calendar
//! substitutions that clamp to the last valid day of the target month, so
//! `2012-01-31 + 1 month` is `2012-02-29` and `2012-02-29 + 1 year` is
//! `2013-02-28`. Time of day, sub-second fields and the zone offset are
//! never touched by month or year addition.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::Serialize;

use crate::error::TempoError;
use crate::value::CivilDateTime;

/// A unit accepted by [`add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The exact length of `n` units, `None` for calendar units or overflow.
    pub(crate) fn fixed_delta(&self, n: i64) -> Option<TimeDelta> {
        match self {
            Self::Second => TimeDelta::try_seconds(n),
            Self::Minute => TimeDelta::try_minutes(n),
            Self::Hour => TimeDelta::try_hours(n),
            Self::Day => TimeDelta::try_days(n),
            Self::Week => TimeDelta::try_weeks(n),
            Self::Month | Self::Year => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Self::Second),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(Self::Minute),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(Self::Hour),
            "d" | "day" | "days" => Ok(Self::Day),
            "w" | "wk" | "week" | "weeks" => Ok(Self::Week),
            "mo" | "mon" | "month" | "months" => Ok(Self::Month),
            "y" | "yr" | "year" | "years" => Ok(Self::Year),
            other => Err(TempoError::Value(format!("unknown time unit '{other}'"))),
        }
    }
}

/// Add `n` units (negative `n` subtracts) to `dt`.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if the result falls outside the
/// representable calendar.
///
/// # Examples
///
/// ```
/// use tempo_engine::{add, CivilDateTime, TimeUnit};
///
/// let dt = CivilDateTime::from_ymd_hms(2012, 12, 31, 8, 30, 0).unwrap();
/// let later = add(&dt, 2, TimeUnit::Month).unwrap();
/// assert_eq!(later.to_string(), "2013-02-28 08:30:00");
/// ```
pub fn add(dt: &CivilDateTime, n: i64, unit: TimeUnit) -> Result<CivilDateTime, TempoError> {
    let result = match unit {
        TimeUnit::Month => shift_months(dt, n),
        TimeUnit::Year => shift_years(dt, n),
        fixed => fixed.fixed_delta(n).and_then(|delta| dt.checked_add(delta)),
    };
    result.ok_or_else(|| TempoError::Value(format!("{dt} plus {n} {unit}(s) is out of range")))
}

fn shift_months(dt: &CivilDateTime, n: i64) -> Option<CivilDateTime> {
    let date = dt.date();
    let total = (i64::from(date.year()) * 12 + i64::from(date.month0())).checked_add(n)?;
    let (year, month0) = (total.div_euclid(12), total.rem_euclid(12));
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month0).ok()? + 1;

    let target = NaiveDate::from_ymd_opt(year, month, date.day()).or_else(|| {
        // The day does not exist in the target month: step back from the
        // first day of the month after it.
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1)?, 1)
        } else {
            (year, month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
    })?;
    Some(dt.with_wall_clock(target.and_time(dt.time())))
}

fn shift_years(dt: &CivilDateTime, n: i64) -> Option<CivilDateTime> {
    let date = dt.date();
    let year = i32::try_from(i64::from(date.year()).checked_add(n)?).ok()?;
    // Only Feb 29 can become invalid.
    let target = NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))?;
    Some(dt.with_wall_clock(target.and_time(dt.time())))
}

pub fn add_seconds(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Second)
}

pub fn add_minutes(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Minute)
}

pub fn add_hours(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Hour)
}

pub fn add_days(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Day)
}

pub fn add_weeks(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Week)
}

/// Month addition clamped to the last day of the target month.
pub fn add_months(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Month)
}

/// Year addition; Feb 29 lands on Feb 28 in common years.
pub fn add_years(dt: &CivilDateTime, n: i64) -> Result<CivilDateTime, TempoError> {
    add(dt, n, TimeUnit::Year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epoch::to_epoch_offset;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    fn civil(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CivilDateTime {
        CivilDateTime::from_ymd_hms(y, m, d, h, mi, s).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> CivilDateTime {
        civil(y, m, d, 0, 0, 0)
    }

    // ── fixed units ─────────────────────────────────────────────────────

    #[test]
    fn test_add_seconds_through_weeks() {
        let dt = civil(2014, 1, 1, 0, 0, 0);
        assert_eq!(add_seconds(&dt, 1).unwrap(), civil(2014, 1, 1, 0, 0, 1));
        assert_eq!(add_seconds(&dt, -1).unwrap(), civil(2013, 12, 31, 23, 59, 59));
        assert_eq!(add_minutes(&dt, 90).unwrap(), civil(2014, 1, 1, 1, 30, 0));
        assert_eq!(add_hours(&dt, -25).unwrap(), civil(2013, 12, 30, 23, 0, 0));
        assert_eq!(add_days(&dt, 31).unwrap(), civil(2014, 2, 1, 0, 0, 0));
        assert_eq!(add_weeks(&dt, 2).unwrap(), civil(2014, 1, 15, 0, 0, 0));
    }

    #[test]
    fn test_fixed_units_match_epoch_arithmetic() {
        let dt = civil(1969, 12, 31, 12, 0, 0);
        let later = add_hours(&dt, 36).unwrap();
        assert_eq!(to_epoch_offset(&later) - to_epoch_offset(&dt), 36.0 * 3600.0);
    }

    #[test]
    fn test_overflow_is_value_error() {
        let dt = civil(2014, 1, 1, 0, 0, 0);
        assert!(matches!(add_seconds(&dt, i64::MAX), Err(TempoError::Value(_))));
        assert!(matches!(add_years(&dt, i64::MAX), Err(TempoError::Value(_))));
        assert!(matches!(add_months(&dt, i64::MIN), Err(TempoError::Value(_))));
    }

    // ── months ──────────────────────────────────────────────────────────

    #[test]
    fn test_add_months_clamps_into_leap_february() {
        assert_eq!(add_months(&day(2012, 1, 31), 1).unwrap(), day(2012, 2, 29));
        assert_eq!(add_months(&day(2012, 3, 31), -1).unwrap(), day(2012, 2, 29));
        assert_eq!(add_months(&day(2012, 12, 31), 2).unwrap(), day(2013, 2, 28));
    }

    #[test]
    fn test_add_months_across_years() {
        assert_eq!(add_months(&day(2012, 11, 15), 2).unwrap(), day(2013, 1, 15));
        assert_eq!(add_months(&day(2012, 1, 15), -1).unwrap(), day(2011, 12, 15));
        assert_eq!(add_months(&day(2012, 12, 15), 12).unwrap(), day(2013, 12, 15));
        assert_eq!(add_months(&day(2012, 1, 15), -13).unwrap(), day(2010, 12, 15));
    }

    #[test]
    fn test_add_months_into_thirty_day_month() {
        assert_eq!(add_months(&day(2014, 5, 31), 1).unwrap(), day(2014, 6, 30));
        assert_eq!(add_months(&day(2014, 10, 31), 1).unwrap(), day(2014, 11, 30));
    }

    #[test]
    fn test_add_months_preserves_time_and_offset() {
        let plus_nine = FixedOffset::east_opt(9 * 3600).unwrap();
        let dt = CivilDateTime::aware(civil(2014, 1, 31, 17, 58, 31).naive_local(), plus_nine);
        let shifted = add_months(&dt, 1).unwrap();
        assert_eq!(shifted.naive_local(), civil(2014, 2, 28, 17, 58, 31).naive_local());
        assert_eq!(shifted.offset(), Some(plus_nine));
    }

    // ── years ───────────────────────────────────────────────────────────

    #[test]
    fn test_add_years_leap_day() {
        assert_eq!(add_years(&day(2012, 2, 29), 1).unwrap(), day(2013, 2, 28));
        assert_eq!(add_years(&day(2012, 2, 29), -1).unwrap(), day(2011, 2, 28));
        assert_eq!(add_years(&day(2012, 2, 29), 4).unwrap(), day(2016, 2, 29));
    }

    #[test]
    fn test_add_years_preserves_offset() {
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = CivilDateTime::aware(civil(2012, 2, 29, 6, 0, 0).naive_local(), minus_five);
        assert_eq!(add_years(&dt, 1).unwrap().offset(), Some(minus_five));
    }

    // ── units ───────────────────────────────────────────────────────────

    #[test]
    fn test_time_unit_from_str() {
        assert_eq!("Days".parse::<TimeUnit>().unwrap(), TimeUnit::Day);
        assert_eq!(" min ".parse::<TimeUnit>().unwrap(), TimeUnit::Minute);
        assert_eq!("year".parse::<TimeUnit>().unwrap(), TimeUnit::Year);
        assert!(matches!("fortnight".parse::<TimeUnit>(), Err(TempoError::Value(_))));
    }

    // ── properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_add_months_stays_valid_and_clamps(
            year in 1900_i32..2100,
            month in 1_u32..=12,
            day in 1_u32..=31,
            n in -600_i64..600,
        ) {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                return Ok(());
            };
            let dt = CivilDateTime::midnight(date);
            let shifted = add_months(&dt, n).unwrap();
            let months_moved = (i64::from(shifted.date().year()) * 12
                + i64::from(shifted.date().month0()))
                - (i64::from(year) * 12 + i64::from(month - 1));
            prop_assert_eq!(months_moved, n);
            prop_assert!(shifted.date().day() <= day);
            prop_assert_eq!(shifted.time(), dt.time());
        }
    }
}
