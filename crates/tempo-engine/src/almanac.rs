//! A constructed context that owns one parser cache and one random source.
//!
//! Every operation on [`Almanac`] accepts anything convertible into
//! [`TimeInput`], so text, epoch offsets and chrono values can be mixed
//! freely. Text is routed through the context's own [`CascadeParser`]: two
//! almanacs never share a preferred pattern or a fallback latch.

use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arithmetic::{self, TimeUnit};
use crate::coerce::TimeInput;
use crate::error::TempoError;
use crate::parser::{CascadeParser, DatetimeStance, ParserOptions};
use crate::random;
use crate::rounding::{self, RoundMode};
use crate::series::{self, SeriesOptions, WeekdaySet};
use crate::value::{CalendarDate, CivilDateTime};

/// Options for [`Almanac::with_options`].
#[derive(Debug, Clone, Default)]
pub struct AlmanacOptions {
    pub parser: ParserOptions,
    /// Seed for the random generators. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Parser, arithmetic and generators behind one owned cache.
#[derive(Debug, Clone)]
pub struct Almanac {
    parser: CascadeParser,
    rng: ChaCha8Rng,
}

impl Default for Almanac {
    fn default() -> Self {
        Self::with_options(AlmanacOptions::default())
    }
}

impl Almanac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AlmanacOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            parser: CascadeParser::with_options(options.parser),
            rng,
        }
    }

    pub fn parser(&self) -> &CascadeParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut CascadeParser {
        &mut self.parser
    }

    pub fn stance(&self) -> DatetimeStance {
        self.parser.stance()
    }

    /// Restore catalog-first parsing.
    pub fn reset(&mut self) {
        self.parser.reset();
    }

    // ── parsing and coercion ────────────────────────────────────────────

    pub fn parse_date(&mut self, text: &str) -> Result<CalendarDate, TempoError> {
        self.parser.parse_date(text)
    }

    pub fn parse_datetime(&mut self, text: &str) -> Result<CivilDateTime, TempoError> {
        self.parser.parse_datetime(text)
    }

    pub fn coerce_to_date(&mut self, value: impl Into<TimeInput>) -> Result<CalendarDate, TempoError> {
        self.parser.coerce_to_date(value)
    }

    pub fn coerce_to_datetime(
        &mut self,
        value: impl Into<TimeInput>,
    ) -> Result<CivilDateTime, TempoError> {
        self.parser.coerce_to_datetime(value)
    }

    fn optional_datetime(&mut self, value: impl Into<TimeInput>) -> Result<Option<CivilDateTime>, TempoError> {
        match value.into() {
            TimeInput::Missing => Ok(None),
            other => self.parser.coerce_to_datetime(other).map(Some),
        }
    }

    // ── arithmetic and rounding ─────────────────────────────────────────

    /// Coerce `value` and add `n` units to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo_engine::{Almanac, TimeUnit};
    ///
    /// let mut almanac = Almanac::new();
    /// let dt = almanac.add("2012-02-29", 1, TimeUnit::Year).unwrap();
    /// assert_eq!(dt.to_string(), "2013-02-28 00:00:00");
    /// ```
    pub fn add(
        &mut self,
        value: impl Into<TimeInput>,
        n: i64,
        unit: TimeUnit,
    ) -> Result<CivilDateTime, TempoError> {
        let dt = self.coerce_to_datetime(value)?;
        arithmetic::add(&dt, n, unit)
    }

    pub fn round_to(
        &mut self,
        value: impl Into<TimeInput>,
        hour: u32,
        minute: u32,
        second: u32,
        mode: RoundMode,
    ) -> Result<CivilDateTime, TempoError> {
        let dt = self.coerce_to_datetime(value)?;
        rounding::round_to(&dt, hour, minute, second, mode)
    }

    // ── series ──────────────────────────────────────────────────────────

    /// [`series::time_series`] over coerced bounds; a missing bound counts
    /// as not given.
    pub fn time_series(
        &mut self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
        periods: Option<usize>,
        options: &SeriesOptions,
    ) -> Result<Vec<CivilDateTime>, TempoError> {
        let start = self.optional_datetime(start)?;
        let end = self.optional_datetime(end)?;
        series::time_series(start, end, periods, options)
    }

    pub fn weekday_series(
        &mut self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
        weekdays: impl Into<WeekdaySet>,
    ) -> Result<Vec<CivilDateTime>, TempoError> {
        let start = self.coerce_to_datetime(start)?;
        let end = self.coerce_to_datetime(end)?;
        series::weekday_series(start, end, weekdays)
    }

    // ── random samples ──────────────────────────────────────────────────

    /// Missing bounds default to 1970-01-01 and today (local).
    fn date_bounds(
        &mut self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<(CalendarDate, CalendarDate), TempoError> {
        let start = match start.into() {
            TimeInput::Missing => NaiveDate::default(),
            other => self.parser.coerce_to_date(other)?,
        };
        let end = match end.into() {
            TimeInput::Missing => Local::now().date_naive(),
            other => self.parser.coerce_to_date(other)?,
        };
        Ok((start, end))
    }

    /// Missing bounds default to 1970-01-01 00:00:00 and now (local).
    fn datetime_bounds(
        &mut self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<(CivilDateTime, CivilDateTime), TempoError> {
        let start = self
            .optional_datetime(start)?
            .unwrap_or_else(|| CivilDateTime::midnight(NaiveDate::default()));
        let end = self
            .optional_datetime(end)?
            .unwrap_or_else(|| CivilDateTime::naive(Local::now().naive_local()));
        Ok((start, end))
    }

    pub fn rnd_date(
        &mut self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<CalendarDate, TempoError> {
        let (start, end) = self.date_bounds(start, end)?;
        random::rnd_date(&mut self.rng, start, end)
    }

    pub fn rnd_date_array(
        &mut self,
        size: usize,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<Vec<CalendarDate>, TempoError> {
        let (start, end) = self.date_bounds(start, end)?;
        random::rnd_date_array(&mut self.rng, size, start, end)
    }

    pub fn rnd_date_matrix(
        &mut self,
        rows: usize,
        cols: usize,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<Vec<Vec<CalendarDate>>, TempoError> {
        let (start, end) = self.date_bounds(start, end)?;
        random::rnd_date_matrix(&mut self.rng, rows, cols, start, end)
    }

    pub fn rnd_datetime(
        &mut self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<CivilDateTime, TempoError> {
        let (start, end) = self.datetime_bounds(start, end)?;
        random::rnd_datetime(&mut self.rng, &start, &end)
    }

    pub fn rnd_datetime_array(
        &mut self,
        size: usize,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<Vec<CivilDateTime>, TempoError> {
        let (start, end) = self.datetime_bounds(start, end)?;
        random::rnd_datetime_array(&mut self.rng, size, &start, &end)
    }

    pub fn rnd_datetime_matrix(
        &mut self,
        rows: usize,
        cols: usize,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<Vec<Vec<CivilDateTime>>, TempoError> {
        let (start, end) = self.datetime_bounds(start, end)?;
        random::rnd_datetime_matrix(&mut self.rng, rows, cols, &start, &end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> Almanac {
        Almanac::with_options(AlmanacOptions {
            seed: Some(seed),
            ..AlmanacOptions::default()
        })
    }

    fn civil(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> CivilDateTime {
        CivilDateTime::from_ymd_hms(y, m, d, h, mi, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_contexts_do_not_share_latch() {
        let mut a = Almanac::new();
        let mut b = Almanac::new();
        a.parse_datetime("2000-01-01T00:00:00-5").unwrap();
        b.parse_datetime("2014-01-15 17:58:31").unwrap();
        assert_eq!(a.stance(), DatetimeStance::AlwaysFallback);
        assert_eq!(b.stance(), DatetimeStance::Catalog { preferred: 0 });
        a.reset();
        assert_eq!(a.stance(), DatetimeStance::Catalog { preferred: 0 });
    }

    #[test]
    fn test_parser_options_reach_the_owned_parser() {
        let mut almanac = Almanac::with_options(AlmanacOptions {
            parser: ParserOptions {
                heuristic_fallback: false,
            },
            seed: None,
        });
        assert!(almanac.parse_datetime("2000-01-01T00:00:00-5").is_err());
        assert!(!almanac.parser().options().heuristic_fallback);
    }

    // ── arithmetic ──────────────────────────────────────────────────────

    #[test]
    fn test_add_over_text_input() {
        let mut almanac = Almanac::new();
        assert_eq!(almanac.add("2012-01-31", 1, TimeUnit::Month).unwrap(), civil(2012, 2, 29, 0, 0, 0));
        assert_eq!(almanac.add("2012-06-30", 1, TimeUnit::Month).unwrap(), civil(2012, 7, 30, 0, 0, 0));
        assert_eq!(almanac.add("2012-03-29", 11, TimeUnit::Month).unwrap(), civil(2013, 2, 28, 0, 0, 0));
        assert_eq!(almanac.add("2011-02-28", 1, TimeUnit::Year).unwrap(), civil(2012, 2, 28, 0, 0, 0));
    }

    #[test]
    fn test_add_over_epoch_input() {
        let mut almanac = Almanac::new();
        assert_eq!(almanac.add(0_i64, -1, TimeUnit::Second).unwrap(), civil(1969, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_add_rejects_missing() {
        let mut almanac = Almanac::new();
        assert!(matches!(
            almanac.add(TimeInput::Missing, 1, TimeUnit::Day),
            Err(TempoError::Type(_))
        ));
    }

    #[test]
    fn test_round_to_over_text_input() {
        let mut almanac = Almanac::new();
        let dt = almanac.round_to("2014-06-01 00:00:00", 0, 0, 0, RoundMode::Floor).unwrap();
        assert_eq!(dt, civil(2014, 6, 1, 0, 0, 0));
    }

    // ── series ──────────────────────────────────────────────────────────

    #[test]
    fn test_time_series_over_text_input() {
        let mut almanac = Almanac::new();
        let options = SeriesOptions::new("5min".parse().unwrap());
        let series = almanac
            .time_series("2014-01-01 03:00:00", TimeInput::Missing, Some(3), &options)
            .unwrap();
        assert_eq!(series.last(), Some(&civil(2014, 1, 1, 3, 10, 0)));
    }

    #[test]
    fn test_time_series_daily_default() {
        let mut almanac = Almanac::new();
        let series = almanac
            .time_series("2014-1-1", "2014-1-7", None, &SeriesOptions::default())
            .unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(series[6], civil(2014, 1, 7, 0, 0, 0));
    }

    #[test]
    fn test_time_series_with_nothing_given() {
        let mut almanac = Almanac::new();
        let err = almanac
            .time_series(TimeInput::Missing, TimeInput::Missing, None, &SeriesOptions::default())
            .unwrap_err();
        assert!(matches!(err, TempoError::Value(_)));
    }

    #[test]
    fn test_weekday_series_over_text_input() {
        let mut almanac = Almanac::new();
        let series = almanac
            .weekday_series("2014-01-01 06:30:25", "2014-02-01 06:30:25", 2_u32)
            .unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], civil(2014, 1, 7, 6, 30, 25));
    }

    // ── random ──────────────────────────────────────────────────────────

    #[test]
    fn test_rnd_date_mixed_inputs() {
        let mut almanac = seeded(1);
        let d = almanac.rnd_date("2014-01-01", date(2014, 1, 31)).unwrap();
        assert!(d >= date(2014, 1, 1) && d <= date(2014, 1, 31));
        assert_eq!(almanac.rnd_date("2014-06-01", "2014-06-01").unwrap(), date(2014, 6, 1));
    }

    #[test]
    fn test_rnd_date_defaults() {
        let mut almanac = seeded(1);
        let none: Option<NaiveDate> = None;
        let d = almanac.rnd_date(none, none).unwrap();
        assert!(d >= date(1970, 1, 1) && d <= Local::now().date_naive());
    }

    #[test]
    fn test_rnd_datetime_exact_bound() {
        let mut almanac = seeded(2);
        let dt = almanac.rnd_datetime("2014-06-01 6:30:00", "2014-06-01 6:30:00").unwrap();
        assert_eq!(dt, civil(2014, 6, 1, 6, 30, 0));
    }

    #[test]
    fn test_rnd_shapes() {
        let mut almanac = seeded(3);
        let end = civil(2014, 1, 31, 23, 59, 59);
        assert_eq!(almanac.rnd_datetime_array(4, "2014-01-01", end).unwrap().len(), 4);
        let matrix = almanac.rnd_datetime_matrix(2, 3, "2014-01-01", end).unwrap();
        assert_eq!((matrix.len(), matrix[0].len()), (2, 3));
        let matrix = almanac.rnd_date_matrix(2, 3, "2014-01-01", date(2014, 1, 31)).unwrap();
        assert_eq!((matrix.len(), matrix[1].len()), (2, 3));
        assert_eq!(almanac.rnd_date_array(5, TimeInput::Missing, TimeInput::Missing).unwrap().len(), 5);
    }

    #[test]
    fn test_seed_reproduces_samples() {
        let a = seeded(99).rnd_datetime_array(6, "1990-01-01", "2020-01-01").unwrap();
        let b = seeded(99).rnd_datetime_array(6, "1990-01-01", "2020-01-01").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reversed_random_bounds_are_value_errors() {
        let mut almanac = seeded(4);
        assert!(matches!(almanac.rnd_date("2014-02-01", "2014-01-01"), Err(TempoError::Value(_))));
        assert!(matches!(
            almanac.rnd_datetime("2014-02-01", "2014-01-01"),
            Err(TempoError::Value(_))
        ));
    }
}
