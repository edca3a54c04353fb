//! Zone conversions between UTC and other wall clocks.
//!
//! Zone-naive input is taken as a UTC wall clock throughout this module.

use chrono::{Local, Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::TempoError;
use crate::value::CivilDateTime;

/// Look up an IANA zone name such as `"America/New_York"`.
pub fn parse_timezone(name: &str) -> Result<Tz, TempoError> {
    name.parse::<Tz>()
        .map_err(|_| TempoError::Value(format!("unknown time zone '{name}'")))
}

/// The zone-naive UTC wall clock of `dt`. Naive values pass through.
pub fn to_utc(dt: &CivilDateTime) -> CivilDateTime {
    CivilDateTime::naive(dt.utc_naive())
}

/// Move a UTC value onto the wall clock of `zone`.
///
/// With `keep_offset` the result carries the zone's offset at that instant,
/// otherwise it is zone-naive.
pub fn utc_to_zone<Z: TimeZone>(dt: &CivilDateTime, zone: &Z, keep_offset: bool) -> CivilDateTime {
    let local = zone.from_utc_datetime(&dt.utc_naive());
    if keep_offset {
        CivilDateTime::aware(local.naive_local(), local.offset().fix())
    } else {
        CivilDateTime::naive(local.naive_local())
    }
}

/// [`utc_to_zone`] for a zone given by IANA name.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if `name` is not a known zone.
pub fn utc_to_named_zone(
    dt: &CivilDateTime,
    name: &str,
    keep_offset: bool,
) -> Result<CivilDateTime, TempoError> {
    let zone = parse_timezone(name)?;
    Ok(utc_to_zone(dt, &zone, keep_offset))
}

/// [`utc_to_zone`] for the machine's local zone.
pub fn utc_to_local(dt: &CivilDateTime, keep_offset: bool) -> CivilDateTime {
    utc_to_zone(dt, &Local, keep_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn civil(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CivilDateTime {
        CivilDateTime::from_ymd_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Asia/Tokyo").is_ok());
        let err = parse_timezone("Mars/Olympus").unwrap_err();
        assert!(matches!(err, TempoError::Value(_)));
    }

    #[test]
    fn test_to_utc_strips_offset() {
        let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
        let dt = CivilDateTime::aware(civil(2014, 1, 1, 8, 0, 0).naive_local(), plus_eight);
        let utc = to_utc(&dt);
        assert!(!utc.is_aware());
        assert_eq!(utc, civil(2014, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_to_utc_naive_passthrough() {
        let dt = civil(2014, 1, 1, 8, 0, 0);
        assert_eq!(to_utc(&dt), dt);
    }

    #[test]
    fn test_utc_to_named_zone() {
        let dt = civil(2014, 7, 1, 12, 0, 0);
        let ny = utc_to_named_zone(&dt, "America/New_York", false).unwrap();
        assert_eq!(ny, civil(2014, 7, 1, 8, 0, 0));

        let ny = utc_to_named_zone(&dt, "America/New_York", true).unwrap();
        assert_eq!(ny.offset().map(|o| o.local_minus_utc()), Some(-4 * 3600));
        assert_eq!(ny.cmp_instant(&dt), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_utc_to_named_zone_rejects_unknown() {
        let dt = civil(2014, 7, 1, 12, 0, 0);
        assert!(utc_to_named_zone(&dt, "Nowhere/Special", false).is_err());
    }

    #[test]
    fn test_utc_to_local_round_trips_through_to_utc() {
        let dt = civil(2014, 1, 15, 12, 0, 0);
        let local = utc_to_local(&dt, true);
        assert_eq!(to_utc(&local), dt);
        assert!(local.is_aware());
    }
}
