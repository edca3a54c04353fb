//! Conversion between calendar values and numeric offsets.
//!
//! Two timestamp pairs live here and they are deliberately *not* the same:
//!
//! - [`to_epoch_offset`] / [`from_epoch_offset`] treat zone-naive values as
//!   UTC.
//! - [`to_local_timestamp`] / [`from_local_timestamp`] treat zone-naive
//!   values as the machine's local time.
//!
//! A zone-aware value denotes one instant, so both pairs agree on it. All
//! arithmetic is plain subtraction from the 1970-01-01 anchor, which keeps
//! dates before the epoch working.

use chrono::{Datelike, Local, NaiveDateTime, TimeDelta, TimeZone};

use crate::error::TempoError;
use crate::value::{CalendarDate, CivilDateTime};

/// Largest magnitude accepted by [`from_epoch_offset`], well past chrono's
/// representable range so the range check stays with chrono.
const MAX_OFFSET_SECONDS: f64 = 1e15;

fn epoch_anchor() -> NaiveDateTime {
    NaiveDateTime::default()
}

fn delta_seconds(delta: TimeDelta) -> f64 {
    // subsec_nanos carries the sign of the delta.
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}

/// Seconds since 1970-01-01 00:00:00 UTC. Zone-naive values are taken as UTC.
///
/// # Examples
///
/// ```
/// use tempo_engine::{to_epoch_offset, CivilDateTime};
///
/// let dt = CivilDateTime::from_ymd_hms(1969, 12, 31, 23, 59, 59).unwrap();
/// assert_eq!(to_epoch_offset(&dt), -1.0);
/// ```
pub fn to_epoch_offset(dt: &CivilDateTime) -> f64 {
    delta_seconds(dt.utc_naive() - epoch_anchor())
}

/// The zone-naive UTC date-time `seconds` after the epoch (before it when
/// negative). Fractions are kept to the microsecond.
///
/// # Errors
///
/// Returns [`TempoError::Value`] for a non-finite offset or one that lands
/// outside the representable calendar.
pub fn from_epoch_offset(seconds: f64) -> Result<CivilDateTime, TempoError> {
    if !seconds.is_finite() || seconds.abs() > MAX_OFFSET_SECONDS {
        return Err(TempoError::Value(format!(
            "epoch offset {seconds} is out of range"
        )));
    }

    let mut whole = seconds.floor();
    let mut micros = ((seconds - whole) * 1e6).round();
    if micros >= 1e6 {
        whole += 1.0;
        micros = 0.0;
    }

    TimeDelta::try_seconds(whole as i64)
        .and_then(|delta| delta.checked_add(&TimeDelta::microseconds(micros as i64)))
        .and_then(|delta| epoch_anchor().checked_add_signed(delta))
        .map(CivilDateTime::naive)
        .ok_or_else(|| TempoError::Value(format!("epoch offset {seconds} is out of range")))
}

/// Seconds since the epoch, reading a zone-naive `dt` as wall-clock time in
/// `zone`. Aware values ignore `zone`.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if the wall clock does not exist in `zone`
/// (a daylight-saving gap). Ambiguous wall clocks resolve to the earlier
/// instant.
pub fn to_zoned_timestamp<Z: TimeZone>(dt: &CivilDateTime, zone: &Z) -> Result<f64, TempoError> {
    if dt.is_aware() {
        return Ok(to_epoch_offset(dt));
    }
    let local = zone
        .from_local_datetime(&dt.naive_local())
        .earliest()
        .ok_or_else(|| {
            TempoError::Value(format!("{dt} does not exist in the requested time zone"))
        })?;
    Ok(delta_seconds(local.naive_utc() - epoch_anchor()))
}

/// The zone-naive wall clock in `zone` at `seconds` after the epoch.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if the offset is out of range.
pub fn from_zoned_timestamp<Z: TimeZone>(seconds: f64, zone: &Z) -> Result<CivilDateTime, TempoError> {
    let utc = from_epoch_offset(seconds)?.naive_local();
    Ok(CivilDateTime::naive(zone.from_utc_datetime(&utc).naive_local()))
}

/// [`to_zoned_timestamp`] in the machine's local zone.
///
/// Unlike [`to_epoch_offset`], a zone-naive value here is local time.
pub fn to_local_timestamp(dt: &CivilDateTime) -> Result<f64, TempoError> {
    to_zoned_timestamp(dt, &Local)
}

/// [`from_zoned_timestamp`] in the machine's local zone.
///
/// Unlike [`from_epoch_offset`], the result is a local wall clock.
pub fn from_local_timestamp(seconds: f64) -> Result<CivilDateTime, TempoError> {
    from_zoned_timestamp(seconds, &Local)
}

/// Proleptic Gregorian day number, 0001-01-01 being day 1.
pub fn to_ordinal(date: &CalendarDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Inverse of [`to_ordinal`].
///
/// # Errors
///
/// Returns [`TempoError::Value`] if the ordinal is outside the representable
/// calendar.
pub fn from_ordinal(ordinal: i64) -> Result<CalendarDate, TempoError> {
    i32::try_from(ordinal)
        .ok()
        .and_then(CalendarDate::from_num_days_from_ce_opt)
        .ok_or_else(|| TempoError::Value(format!("day ordinal {ordinal} is out of range")))
}
