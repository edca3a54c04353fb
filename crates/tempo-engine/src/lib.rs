//! # tempo-engine
//!
//! Calendar value toolkit.
//!
//! Turns free-form timestamps into structured values with a self-tuning
//! pattern cascade, converts to and from epoch offsets on both sides of 1970,
//! adds months and years without producing impossible dates, snaps values to
//! a time of day, and generates evenly spaced or random series.
//!
//! ## Modules
//!
//! - [`catalog`] — Ordered date and date-time patterns (matching precedence is part of the contract)
//! - [`parser`] — Cascade parser with a preferred-pattern cache and sticky fallback latch
//! - [`fallback`] — Heuristic parser used once the catalog is exhausted
//! - [`coerce`] — Normalize text, ordinals, epoch offsets and chrono values
//! - [`epoch`] — UTC and local epoch offsets, day ordinals
//! - [`zone`] — UTC to named, fixed or local zone conversion
//! - [`arithmetic`] — Calendar-safe addition of seconds through years
//! - [`rounding`] — Floor, ceiling and nearest rounding to a time of day
//! - [`series`] — Evenly spaced and weekday-filtered series
//! - [`random`] — Uniform random dates and date-times
//! - [`interval`] — Day, month and year bounds
//! - [`almanac`] — Context object owning a parser and a random source
//! - [`value`] — `CalendarDate` and `CivilDateTime`
//! - [`error`] — Error types

pub mod almanac;
pub mod arithmetic;
pub mod catalog;
pub mod coerce;
pub mod epoch;
pub mod error;
pub mod fallback;
pub mod interval;
pub mod parser;
pub mod random;
pub mod rounding;
pub mod series;
pub mod value;
pub mod zone;

pub use almanac::{Almanac, AlmanacOptions};
pub use arithmetic::{
    add, add_days, add_hours, add_minutes, add_months, add_seconds, add_weeks, add_years,
    TimeUnit,
};
pub use catalog::{Pattern, DATETIME_PATTERNS, DATE_PATTERNS};
pub use coerce::TimeInput;
pub use epoch::{
    from_epoch_offset, from_local_timestamp, from_ordinal, from_zoned_timestamp,
    to_epoch_offset, to_local_timestamp, to_ordinal, to_zoned_timestamp,
};
pub use error::TempoError;
pub use fallback::parse_heuristic;
pub use interval::{day_interval, month_interval, year_interval, Interval, RenderedInterval, Resolution};
pub use parser::{CascadeParser, DatetimeStance, ParserOptions, SharedParser};
pub use random::{
    rnd_date, rnd_date_array, rnd_date_matrix, rnd_datetime, rnd_datetime_array,
    rnd_datetime_matrix,
};
pub use rounding::{round_to, RoundMode};
pub use series::{time_series, weekday_series, Frequency, SeriesOptions, WeekdaySet};
pub use value::{is_weekday, is_weekend, CalendarDate, CivilDateTime};
pub use zone::{parse_timezone, to_utc, utc_to_local, utc_to_named_zone, utc_to_zone};
