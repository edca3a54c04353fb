//! Snap a date-time to a fixed time of day.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, TimeDelta};
use serde::Serialize;

use crate::error::TempoError;
use crate::value::CivilDateTime;

/// Direction used by [`round_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    /// The latest matching time at or before the input.
    Floor,
    /// The earliest matching time at or after the input.
    Ceiling,
    /// Whichever of floor and ceiling is closer; ties go to floor.
    #[default]
    Nearest,
}

impl RoundMode {
    const NAMES: [&'static str; 3] = ["floor", "ceiling", "round"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::Nearest => "round",
        }
    }
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundMode {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floor" => Ok(Self::Floor),
            "ceiling" => Ok(Self::Ceiling),
            "round" | "nearest" => Ok(Self::Nearest),
            _ => Err(TempoError::Value(format!(
                "mode '{s}' has to be one of {:?}",
                Self::NAMES
            ))),
        }
    }
}

/// Round `dt` to `hour:minute:second` on a neighboring day.
///
/// The candidate is `dt`'s own date at the given time (sub-second zero,
/// offset kept). Floor steps back a day when the candidate is later than
/// `dt`; ceiling steps forward a day when it is earlier.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if the time fields are out of range or the
/// neighboring day is outside the representable calendar.
///
/// # Examples
///
/// ```
/// use tempo_engine::{round_to, CivilDateTime, RoundMode};
///
/// let dt = CivilDateTime::from_ymd_hms(2000, 4, 15, 10, 0, 0).unwrap();
/// let floored = round_to(&dt, 11, 0, 0, RoundMode::Floor).unwrap();
/// assert_eq!(floored.to_string(), "2000-04-14 11:00:00");
/// ```
pub fn round_to(
    dt: &CivilDateTime,
    hour: u32,
    minute: u32,
    second: u32,
    mode: RoundMode,
) -> Result<CivilDateTime, TempoError> {
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        TempoError::Value(format!(
            "{hour:02}:{minute:02}:{second:02} is not a valid time of day"
        ))
    })?;
    let candidate = dt.with_wall_clock(dt.date().and_time(time));
    let target = dt.naive_local();
    let day = TimeDelta::days(1);

    let shifted = |delta: TimeDelta| {
        candidate
            .checked_add(delta)
            .ok_or_else(|| TempoError::Value(format!("rounding {dt} leaves the calendar")))
    };

    match mode {
        RoundMode::Floor if candidate.naive_local() <= target => Ok(candidate),
        RoundMode::Floor => shifted(-day),
        RoundMode::Ceiling if candidate.naive_local() >= target => Ok(candidate),
        RoundMode::Ceiling => shifted(day),
        RoundMode::Nearest => {
            if candidate.naive_local() == target {
                return Ok(candidate);
            }
            let (before, after) = if candidate.naive_local() < target {
                (candidate, shifted(day)?)
            } else {
                (shifted(-day)?, candidate)
            };
            if target - before.naive_local() <= after.naive_local() - target {
                Ok(before)
            } else {
                Ok(after)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn civil(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CivilDateTime {
        CivilDateTime::from_ymd_hms(y, m, d, h, mi, s).unwrap()
    }

    fn ten_am() -> CivilDateTime {
        civil(2000, 4, 15, 10, 0, 0)
    }

    // ── floor / ceiling ─────────────────────────────────────────────────

    #[test]
    fn test_floor() {
        let dt = ten_am();
        assert_eq!(round_to(&dt, 9, 0, 0, RoundMode::Floor).unwrap(), civil(2000, 4, 15, 9, 0, 0));
        assert_eq!(round_to(&dt, 11, 0, 0, RoundMode::Floor).unwrap(), civil(2000, 4, 14, 11, 0, 0));
        assert_eq!(round_to(&dt, 10, 0, 0, RoundMode::Floor).unwrap(), dt);
    }

    #[test]
    fn test_ceiling() {
        let dt = ten_am();
        assert_eq!(round_to(&dt, 11, 0, 0, RoundMode::Ceiling).unwrap(), civil(2000, 4, 15, 11, 0, 0));
        assert_eq!(round_to(&dt, 9, 0, 0, RoundMode::Ceiling).unwrap(), civil(2000, 4, 16, 9, 0, 0));
        assert_eq!(round_to(&dt, 10, 0, 0, RoundMode::Ceiling).unwrap(), dt);
    }

    #[test]
    fn test_floor_at_midnight_on_midnight() {
        let dt = civil(2014, 6, 1, 0, 0, 0);
        assert_eq!(round_to(&dt, 0, 0, 0, RoundMode::Floor).unwrap(), dt);
        assert_eq!(round_to(&dt, 0, 0, 0, RoundMode::Ceiling).unwrap(), dt);
    }

    // ── nearest ─────────────────────────────────────────────────────────

    #[test]
    fn test_nearest() {
        let dt = ten_am();
        assert_eq!(round_to(&dt, 9, 0, 0, RoundMode::Nearest).unwrap(), civil(2000, 4, 15, 9, 0, 0));
        assert_eq!(round_to(&dt, 11, 0, 0, RoundMode::Nearest).unwrap(), civil(2000, 4, 15, 11, 0, 0));
        assert_eq!(round_to(&dt, 10, 0, 0, RoundMode::Nearest).unwrap(), dt);
    }

    #[test]
    fn test_nearest_tie_goes_to_floor() {
        let dt = ten_am();
        assert_eq!(round_to(&dt, 22, 0, 0, RoundMode::Nearest).unwrap(), civil(2000, 4, 14, 22, 0, 0));
    }

    #[test]
    fn test_nearest_crosses_day_forward() {
        let dt = civil(2000, 4, 15, 23, 0, 0);
        assert_eq!(round_to(&dt, 1, 0, 0, RoundMode::Nearest).unwrap(), civil(2000, 4, 16, 1, 0, 0));
    }

    #[test]
    fn test_sub_second_input_is_dropped_from_candidate() {
        let dt = CivilDateTime::naive(
            NaiveDate::from_ymd_opt(2000, 4, 15)
                .unwrap()
                .and_hms_milli_opt(9, 0, 0, 500)
                .unwrap(),
        );
        assert_eq!(round_to(&dt, 9, 0, 0, RoundMode::Floor).unwrap(), civil(2000, 4, 15, 9, 0, 0));
    }

    #[test]
    fn test_offset_is_preserved() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = CivilDateTime::aware(ten_am().naive_local(), plus_two);
        let rounded = round_to(&dt, 9, 0, 0, RoundMode::Ceiling).unwrap();
        assert_eq!(rounded.offset(), Some(plus_two));
    }

    // ── errors ──────────────────────────────────────────────────────────

    #[test]
    fn test_invalid_time_is_value_error() {
        assert!(matches!(
            round_to(&ten_am(), 24, 0, 0, RoundMode::Floor),
            Err(TempoError::Value(_))
        ));
        assert!(round_to(&ten_am(), 0, 60, 0, RoundMode::Floor).is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("FLOOR".parse::<RoundMode>().unwrap(), RoundMode::Floor);
        assert_eq!("round".parse::<RoundMode>().unwrap(), RoundMode::Nearest);
        assert_eq!("nearest".parse::<RoundMode>().unwrap(), RoundMode::Nearest);
        let err = "Unknown".parse::<RoundMode>().unwrap_err();
        assert!(matches!(err, TempoError::Value(_)));
        assert!(err.to_string().contains("ceiling"));
    }
}
