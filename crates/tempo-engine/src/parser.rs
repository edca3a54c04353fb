//! The adaptive template-cascade parser.
//!
//! A [`CascadeParser`] remembers the catalog pattern that last succeeded and
//! tries it first, so homogeneous input streams pay for the full catalog walk
//! only once. When the date-time catalog is exhausted the parser escalates to
//! the heuristic fallback and, on success, latches into an
//! [`DatetimeStance::AlwaysFallback`] stance that skips the catalog until
//! [`CascadeParser::reset`] is called.
//!
//! The preferred-pattern cache and the latch are the only mutable state in
//! the crate. Every mutating method takes `&mut self`, so one instance per
//! worker is the default; [`SharedParser`] serializes access for callers that
//! deliberately share one cache.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace};

use crate::catalog::{datetime_catalog, datetime_pattern, Pattern, DATE_PATTERNS};
use crate::error::TempoError;
use crate::fallback::parse_heuristic;
use crate::value::{CalendarDate, CivilDateTime};

/// How [`CascadeParser::parse_datetime`] handles its next input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeStance {
    /// Try the catalog, starting with the pattern at `preferred`.
    Catalog { preferred: usize },
    /// The catalog failed once; go straight to the heuristic parser.
    AlwaysFallback,
}

impl Default for DatetimeStance {
    fn default() -> Self {
        Self::Catalog { preferred: 0 }
    }
}

/// Options for [`CascadeParser::with_options`].
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Escalate to the heuristic parser when the date-time catalog is
    /// exhausted. When `false` the cascade fails instead and never latches.
    pub heuristic_fallback: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            heuristic_fallback: true,
        }
    }
}

/// Text to calendar-value parser with a self-tuning pattern cache.
#[derive(Debug, Clone, Default)]
pub struct CascadeParser {
    preferred_date: usize,
    stance: DatetimeStance,
    options: ParserOptions,
}

impl CascadeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn stance(&self) -> DatetimeStance {
        self.stance
    }

    /// The date pattern tried first by [`parse_date`](Self::parse_date).
    pub fn preferred_date_pattern(&self) -> &'static Pattern {
        &DATE_PATTERNS[self.preferred_date]
    }

    /// The date-time pattern tried first, `None` while latched to the
    /// fallback parser.
    pub fn preferred_datetime_pattern(&self) -> Option<&'static Pattern> {
        match self.stance {
            DatetimeStance::Catalog { preferred } => datetime_pattern(preferred),
            DatetimeStance::AlwaysFallback => None,
        }
    }

    /// Parse a calendar date using the date catalog only.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::Parse`] when no date pattern matches the whole
    /// of `text`. Date parsing never escalates to the fallback parser.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use tempo_engine::CascadeParser;
    ///
    /// let mut parser = CascadeParser::new();
    /// let date = parser.parse_date("9/21/2014").unwrap();
    /// assert_eq!(date, NaiveDate::from_ymd_opt(2014, 9, 21).unwrap());
    /// assert_eq!(parser.preferred_date_pattern().format, "%m/%d/%Y");
    /// ```
    pub fn parse_date(&mut self, text: &str) -> Result<CalendarDate, TempoError> {
        if let Some(date) = DATE_PATTERNS[self.preferred_date].match_date(text) {
            trace!(pattern = DATE_PATTERNS[self.preferred_date].format, "date fast path");
            return Ok(date);
        }

        for (index, pattern) in DATE_PATTERNS.iter().enumerate() {
            if let Some(date) = pattern.match_date(text) {
                if index != self.preferred_date {
                    debug!(pattern = pattern.format, "preferred date pattern changed");
                    self.preferred_date = index;
                }
                return Ok(date);
            }
        }

        Err(TempoError::Parse(format!("unable to parse date from '{text}'")))
    }

    /// Parse a date-time, cascading from the preferred pattern through the
    /// whole catalog and finally to the heuristic parser.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::Parse`] when neither the catalog nor the
    /// fallback parser can interpret `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tempo_engine::{CascadeParser, DatetimeStance};
    ///
    /// let mut parser = CascadeParser::new();
    /// parser.parse_datetime("2000-01-01T00:00:00-5").unwrap();
    /// assert_eq!(parser.stance(), DatetimeStance::AlwaysFallback);
    ///
    /// parser.reset();
    /// assert_eq!(parser.stance(), DatetimeStance::Catalog { preferred: 0 });
    /// ```
    pub fn parse_datetime(&mut self, text: &str) -> Result<CivilDateTime, TempoError> {
        let preferred = match self.stance {
            DatetimeStance::AlwaysFallback => return parse_heuristic(text),
            DatetimeStance::Catalog { preferred } => preferred,
        };

        if let Some(dt) = datetime_pattern(preferred).and_then(|p| p.match_datetime(text)) {
            trace!(index = preferred, "date-time fast path");
            return Ok(dt);
        }

        if let Some((index, dt)) = datetime_catalog()
            .find_map(|(index, pattern)| pattern.match_datetime(text).map(|dt| (index, dt)))
        {
            self.transition(DatetimeStance::Catalog { preferred: index });
            return Ok(dt);
        }

        if !self.options.heuristic_fallback {
            return Err(TempoError::Parse(format!(
                "unable to parse date-time from '{text}'"
            )));
        }

        let dt = parse_heuristic(text)?;
        self.transition(DatetimeStance::AlwaysFallback);
        Ok(dt)
    }

    /// Restore catalog-first behavior, starting again from the first pattern.
    pub fn reset(&mut self) {
        self.transition(DatetimeStance::default());
    }

    fn transition(&mut self, next: DatetimeStance) {
        if self.stance == next {
            return;
        }
        match next {
            DatetimeStance::Catalog { preferred } => debug!(
                pattern = datetime_pattern(preferred).map(|p| p.format),
                "date-time parser using catalog"
            ),
            DatetimeStance::AlwaysFallback => {
                debug!("date-time catalog exhausted; latched to heuristic parser")
            }
        }
        self.stance = next;
    }
}

/// A [`CascadeParser`] shared by reference between workers.
///
/// Cache updates are serialized through a mutex, so callers observe each
/// other's preferred patterns and the fallback latch. A lock poisoned by a
/// panicking caller is taken over as is; the cache is two plain indices.
#[derive(Debug, Default)]
pub struct SharedParser {
    inner: Mutex<CascadeParser>,
}

impl SharedParser {
    pub fn new(parser: CascadeParser) -> Self {
        Self {
            inner: Mutex::new(parser),
        }
    }

    pub fn parse_date(&self, text: &str) -> Result<CalendarDate, TempoError> {
        self.with(|parser| parser.parse_date(text))
    }

    pub fn parse_datetime(&self, text: &str) -> Result<CivilDateTime, TempoError> {
        self.with(|parser| parser.parse_datetime(text))
    }

    pub fn reset(&self) {
        self.with(CascadeParser::reset)
    }

    pub fn stance(&self) -> DatetimeStance {
        self.with(|parser| parser.stance())
    }

    /// Run `f` with exclusive access to the wrapped parser.
    pub fn with<T>(&self, f: impl FnOnce(&mut CascadeParser) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn into_inner(self) -> CascadeParser {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
