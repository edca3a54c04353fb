//! Inclusive day, month and year bounds.

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

use crate::error::TempoError;
use crate::value::CivilDateTime;

/// Smallest tick separating an interval's end from the next unit's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Second,
    Millisecond,
}

impl Resolution {
    fn tick(&self) -> TimeDelta {
        match self {
            Self::Second => TimeDelta::seconds(1),
            Self::Millisecond => TimeDelta::milliseconds(1),
        }
    }
}

/// A closed `[start, end]` range of zone-naive date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: CivilDateTime,
    pub end: CivilDateTime,
}

/// The textual form of an [`Interval`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedInterval {
    pub start: String,
    pub end: String,
}

impl Interval {
    pub fn contains(&self, dt: &CivilDateTime) -> bool {
        dt.cmp_instant(&self.start).is_ge() && dt.cmp_instant(&self.end).is_le()
    }

    pub fn render(&self) -> RenderedInterval {
        RenderedInterval {
            start: self.start.to_string(),
            end: self.end.to_string(),
        }
    }
}

fn date_or_error(year: i32, month: u32, day: u32) -> Result<NaiveDate, TempoError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        TempoError::Value(format!("{year:04}-{month:02}-{day:02} is not a valid date"))
    })
}

fn bounded(first: NaiveDate, next: NaiveDate, resolution: Resolution) -> Result<Interval, TempoError> {
    let end = CivilDateTime::midnight(next)
        .checked_add(-resolution.tick())
        .ok_or_else(|| TempoError::Value(format!("interval starting {first} is out of range")))?;
    Ok(Interval {
        start: CivilDateTime::midnight(first),
        end,
    })
}

fn next_year(year: i32) -> Result<i32, TempoError> {
    year.checked_add(1)
        .ok_or_else(|| TempoError::Value(format!("year {year} is out of range")))
}

/// The whole of one day.
///
/// # Examples
///
/// ```
/// use tempo_engine::{day_interval, Resolution};
///
/// let day = day_interval(2014, 3, 5, Resolution::Second).unwrap();
/// assert_eq!(day.end.to_string(), "2014-03-05 23:59:59");
/// ```
pub fn day_interval(year: i32, month: u32, day: u32, resolution: Resolution) -> Result<Interval, TempoError> {
    let first = date_or_error(year, month, day)?;
    let next = first
        .succ_opt()
        .ok_or_else(|| TempoError::Value(format!("{first} is the last representable day")))?;
    bounded(first, next, resolution)
}

/// The whole of one calendar month.
pub fn month_interval(year: i32, month: u32, resolution: Resolution) -> Result<Interval, TempoError> {
    let first = date_or_error(year, month, 1)?;
    let next = if month == 12 {
        date_or_error(next_year(year)?, 1, 1)?
    } else {
        date_or_error(year, month + 1, 1)?
    };
    bounded(first, next, resolution)
}

/// The whole of one calendar year.
pub fn year_interval(year: i32, resolution: Resolution) -> Result<Interval, TempoError> {
    let first = date_or_error(year, 1, 1)?;
    let next = date_or_error(next_year(year)?, 1, 1)?;
    bounded(first, next, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn civil(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CivilDateTime {
        CivilDateTime::from_ymd_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_day_interval() {
        let day = day_interval(2014, 12, 31, Resolution::Second).unwrap();
        assert_eq!(day.start, civil(2014, 12, 31, 0, 0, 0));
        assert_eq!(day.end, civil(2014, 12, 31, 23, 59, 59));
        assert!(day.contains(&civil(2014, 12, 31, 12, 0, 0)));
        assert!(!day.contains(&civil(2015, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_month_interval() {
        let march = month_interval(2014, 3, Resolution::Second).unwrap();
        assert_eq!(march.start, civil(2014, 3, 1, 0, 0, 0));
        assert_eq!(march.end, civil(2014, 3, 31, 23, 59, 59));

        let december = month_interval(2014, 12, Resolution::Second).unwrap();
        assert_eq!(december.end, civil(2014, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_month_interval_leap_february() {
        let feb = month_interval(2000, 2, Resolution::Second).unwrap();
        assert_eq!(feb.end, civil(2000, 2, 29, 23, 59, 59));
    }

    #[test]
    fn test_year_interval() {
        let year = year_interval(2014, Resolution::Second).unwrap();
        assert_eq!(year.start, civil(2014, 1, 1, 0, 0, 0));
        assert_eq!(year.end, civil(2014, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_millisecond_resolution() {
        let day = day_interval(2014, 6, 17, Resolution::Millisecond).unwrap();
        assert_eq!(day.end.to_string(), "2014-06-17 23:59:59.999");
    }

    #[test]
    fn test_invalid_calendar_inputs() {
        assert!(matches!(day_interval(2014, 2, 30, Resolution::Second), Err(TempoError::Value(_))));
        assert!(matches!(month_interval(2014, 13, Resolution::Second), Err(TempoError::Value(_))));
        assert!(month_interval(2014, 0, Resolution::Second).is_err());
    }

    #[test]
    fn test_render() {
        let rendered = month_interval(2014, 3, Resolution::Second).unwrap().render();
        assert_eq!(rendered.start, "2014-03-01 00:00:00");
        assert_eq!(rendered.end, "2014-03-31 23:59:59");

        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start": "2014-03-01 00:00:00", "end": "2014-03-31 23:59:59"})
        );
        assert_eq!(serde_json::to_value(Resolution::Millisecond).unwrap(), "millisecond");
    }
}
