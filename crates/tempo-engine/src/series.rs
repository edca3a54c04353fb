//! Evenly spaced date-time sequences.
//!
//! A series is fixed by any two of start, end and period count plus a
//! [`Frequency`] such as `"5min"` or `"3week"`. With start and end both
//! given the end is inclusive and never overshot.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, TimeDelta, Weekday};

use crate::arithmetic::TimeUnit;
use crate::error::TempoError;
use crate::value::CivilDateTime;

const VALID_UNITS: [&str; 17] = [
    "days", "day", "d", "hours", "hour", "h", "minutes", "minute", "min", "m", "seconds",
    "second", "sec", "s", "weeks", "week", "w",
];

/// A positive step: integer magnitude plus a fixed-length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frequency {
    magnitude: i64,
    unit: TimeUnit,
}

impl Frequency {
    /// # Errors
    ///
    /// Returns [`TempoError::Value`] for a non-positive magnitude or a
    /// calendar unit (months and years have no fixed length).
    pub fn new(magnitude: i64, unit: TimeUnit) -> Result<Self, TempoError> {
        if magnitude <= 0 {
            return Err(TempoError::Value(format!(
                "frequency magnitude must be positive, got {magnitude}"
            )));
        }
        if unit.fixed_delta(1).is_none() {
            return Err(TempoError::Value(format!(
                "'{unit}' has no fixed length and cannot be a series frequency"
            )));
        }
        Ok(Self { magnitude, unit })
    }

    pub fn magnitude(&self) -> i64 {
        self.magnitude
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The step as a duration, `None` if it overflows.
    pub fn step(&self) -> Option<TimeDelta> {
        self.unit.fixed_delta(self.magnitude)
    }

    fn step_times(&self, k: i64) -> Result<TimeDelta, TempoError> {
        self.magnitude
            .checked_mul(k)
            .and_then(|n| self.unit.fixed_delta(n))
            .ok_or_else(|| TempoError::Value(format!("{k} steps of {self} overflow")))
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self {
            magnitude: 1,
            unit: TimeUnit::Day,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit)
    }
}

impl FromStr for Frequency {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        let invalid = || {
            TempoError::Value(format!(
                "'{token}' is not a valid frequency, use a number followed by one of {VALID_UNITS:?}"
            ))
        };

        let split = token
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map(|(i, _)| i)
            .ok_or_else(invalid)?;
        let (number, suffix) = token.split_at(split);
        let suffix = suffix.trim();

        let unit = match suffix {
            "days" | "day" | "d" => TimeUnit::Day,
            "hours" | "hour" | "h" => TimeUnit::Hour,
            "minutes" | "minute" | "min" | "m" => TimeUnit::Minute,
            "seconds" | "second" | "sec" | "s" => TimeUnit::Second,
            "weeks" | "week" | "w" => TimeUnit::Week,
            _ => return Err(invalid()),
        };
        let magnitude = number.parse::<i64>().map_err(|_| invalid())?;
        Self::new(magnitude, unit)
    }
}

/// Configuration for [`time_series`].
#[derive(Debug, Clone, Default)]
pub struct SeriesOptions {
    pub freq: Frequency,
    /// Truncate every emitted value to midnight of its own day.
    pub normalize: bool,
}

impl SeriesOptions {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            normalize: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }
}

fn ensure_ordered(start: &CivilDateTime, end: &CivilDateTime) -> Result<(), TempoError> {
    if start.cmp_instant(end).is_gt() {
        return Err(TempoError::Value(format!(
            "start {start} has to be earlier than end {end}"
        )));
    }
    Ok(())
}

/// Generate an evenly spaced series from exactly two of `start`, `end` and
/// `periods`.
///
/// `periods = Some(0)` counts as given and yields an empty series.
///
/// # Errors
///
/// Returns [`TempoError::Value`] when other than two bounds are given, when
/// `start` is after `end`, or when a step leaves the representable calendar.
///
/// # Examples
///
/// ```
/// use tempo_engine::{time_series, CivilDateTime, SeriesOptions};
///
/// let start = CivilDateTime::from_ymd_hms(2014, 1, 1, 3, 0, 0).unwrap();
/// let end = CivilDateTime::from_ymd_hms(2014, 1, 1, 3, 10, 0).unwrap();
/// let options = SeriesOptions::new("5min".parse().unwrap());
/// let series = time_series(Some(start), Some(end), None, &options).unwrap();
/// assert_eq!(series.len(), 3);
/// ```
pub fn time_series(
    start: Option<CivilDateTime>,
    end: Option<CivilDateTime>,
    periods: Option<usize>,
    options: &SeriesOptions,
) -> Result<Vec<CivilDateTime>, TempoError> {
    let freq = options.freq;
    let step = freq
        .step()
        .ok_or_else(|| TempoError::Value(format!("frequency {freq} overflows")))?;

    let raw = match (start, end, periods) {
        (Some(start), Some(end), None) => {
            ensure_ordered(&start, &end)?;
            let mut series = Vec::new();
            let mut current = Some(start);
            while let Some(value) = current.filter(|v| v.cmp_instant(&end).is_le()) {
                series.push(value);
                current = value.checked_add(step);
            }
            series
        }
        (Some(start), None, Some(periods)) => walk(start, periods, &freq)?,
        (None, Some(end), Some(periods)) => {
            let back = i64::try_from(periods.saturating_sub(1))
                .map_err(|_| TempoError::Value(format!("{periods} periods is too many")))?;
            let first = end.checked_add(-freq.step_times(back)?).ok_or_else(|| {
                TempoError::Value(format!("{end} minus {periods} periods is out of range"))
            })?;
            walk(first, periods, &freq)?
        }
        _ => {
            return Err(TempoError::Value(
                "must specify exactly two of 'start', 'end' or 'periods'".to_string(),
            ))
        }
    };

    if options.normalize {
        Ok(raw.iter().map(CivilDateTime::at_midnight).collect())
    } else {
        Ok(raw)
    }
}

fn walk(first: CivilDateTime, periods: usize, freq: &Frequency) -> Result<Vec<CivilDateTime>, TempoError> {
    (0..periods)
        .map(|k| {
            let k = i64::try_from(k)
                .map_err(|_| TempoError::Value(format!("{periods} periods is too many")))?;
            first
                .checked_add(freq.step_times(k)?)
                .ok_or_else(|| TempoError::Value(format!("{first} plus {k} steps is out of range")))
        })
        .collect()
}

/// One or more ISO weekday numbers, Monday = 1 through Sunday = 7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdaySet(Vec<u32>);

impl WeekdaySet {
    fn mask(&self) -> Result<u8, TempoError> {
        self.0.iter().try_fold(0_u8, |mask, &day| match day {
            1..=7 => Ok(mask | (1 << (day - 1))),
            _ => Err(TempoError::Value(format!(
                "weekday {day} is not an ISO weekday number (1..=7)"
            ))),
        })
    }
}

impl From<u32> for WeekdaySet {
    fn from(day: u32) -> Self {
        Self(vec![day])
    }
}

impl From<Weekday> for WeekdaySet {
    fn from(day: Weekday) -> Self {
        Self(vec![day.number_from_monday()])
    }
}

impl From<&[u32]> for WeekdaySet {
    fn from(days: &[u32]) -> Self {
        Self(days.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for WeekdaySet {
    fn from(days: [u32; N]) -> Self {
        Self(days.to_vec())
    }
}

impl From<Vec<u32>> for WeekdaySet {
    fn from(days: Vec<u32>) -> Self {
        Self(days)
    }
}

/// Daily series from `start` to `end` (inclusive) keeping only the given
/// weekdays. Time of day is carried from `start`.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if `start` is after `end` or a weekday
/// number is outside `1..=7`.
pub fn weekday_series(
    start: CivilDateTime,
    end: CivilDateTime,
    weekdays: impl Into<WeekdaySet>,
) -> Result<Vec<CivilDateTime>, TempoError> {
    let mask = weekdays.into().mask()?;
    let daily = time_series(Some(start), Some(end), None, &SeriesOptions::default())?;
    Ok(daily
        .into_iter()
        .filter(|dt| mask & (1 << (dt.date().weekday().number_from_monday() - 1)) != 0)
        .collect())
}
