//! Uniform random dates and date-times within inclusive bounds.
//!
//! Dates are drawn over day ordinals and date-times over whole epoch
//! seconds, so every day or second in range is equally likely. Every
//! function takes the generator explicitly; seed a `ChaCha8Rng` for
//! reproducible samples.

use rand::Rng;

use crate::epoch::{from_epoch_offset, from_ordinal, to_epoch_offset, to_ordinal};
use crate::error::TempoError;
use crate::value::{CalendarDate, CivilDateTime};

fn ensure_ordered<T: PartialOrd + std::fmt::Display>(start: &T, end: &T) -> Result<(), TempoError> {
    if start > end {
        return Err(TempoError::Value(format!(
            "start {start} has to be earlier than end {end}"
        )));
    }
    Ok(())
}

/// A random date between `start` and `end`, both inclusive.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if `start` is after `end`.
pub fn rnd_date<R: Rng + ?Sized>(
    rng: &mut R,
    start: CalendarDate,
    end: CalendarDate,
) -> Result<CalendarDate, TempoError> {
    ensure_ordered(&start, &end)?;
    from_ordinal(rng.gen_range(to_ordinal(&start)..=to_ordinal(&end)))
}

/// A random zone-naive UTC date-time between `start` and `end`, both
/// inclusive, on a whole second.
///
/// # Errors
///
/// Returns [`TempoError::Value`] if `start` is after `end`.
pub fn rnd_datetime<R: Rng + ?Sized>(
    rng: &mut R,
    start: &CivilDateTime,
    end: &CivilDateTime,
) -> Result<CivilDateTime, TempoError> {
    let (low, high) = (to_epoch_offset(start), to_epoch_offset(end));
    if low > high {
        return Err(TempoError::Value(format!(
            "start {start} has to be earlier than end {end}"
        )));
    }
    let (first, last) = (low.ceil() as i64, high.floor() as i64);
    if first > last {
        // No whole second inside a sub-second window.
        return Ok(CivilDateTime::naive(start.utc_naive()));
    }
    from_epoch_offset(rng.gen_range(first..=last) as f64)
}

/// `size` random dates.
pub fn rnd_date_array<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    start: CalendarDate,
    end: CalendarDate,
) -> Result<Vec<CalendarDate>, TempoError> {
    (0..size).map(|_| rnd_date(&mut *rng, start, end)).collect()
}

/// A `rows` by `cols` grid of random dates.
pub fn rnd_date_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    start: CalendarDate,
    end: CalendarDate,
) -> Result<Vec<Vec<CalendarDate>>, TempoError> {
    (0..rows)
        .map(|_| rnd_date_array(&mut *rng, cols, start, end))
        .collect()
}

/// `size` random date-times.
pub fn rnd_datetime_array<R: Rng + ?Sized>(
    rng: &mut R,
    size: usize,
    start: &CivilDateTime,
    end: &CivilDateTime,
) -> Result<Vec<CivilDateTime>, TempoError> {
    (0..size).map(|_| rnd_datetime(&mut *rng, start, end)).collect()
}

/// A `rows` by `cols` grid of random date-times.
pub fn rnd_datetime_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    rows: usize,
    cols: usize,
    start: &CivilDateTime,
    end: &CivilDateTime,
) -> Result<Vec<Vec<CivilDateTime>>, TempoError> {
    (0..rows)
        .map(|_| rnd_datetime_array(&mut *rng, cols, start, end))
        .collect()
}
