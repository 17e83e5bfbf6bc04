//! Date-range normalization.
//!
//! Date pickers hand over optional strings that may carry a time component.
//! [`DateWindow`] turns them into a half-open interval of whole days:
//! `start` is inclusive and `end` is exclusive, one day past the selected end
//! date so that the whole end day is covered.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::PipelineError;

/// Half-open `[start, end)` window of calendar days.
///
/// A missing bound means "no limit" and is passed to the query layer as
/// such; it is never defaulted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateWindow {
    /// A window with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Normalize raw start/end parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDateFormat`] if a non-empty value is
    /// not a `YYYY-MM-DD` date (a trailing time component is ignored).
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Self, PipelineError> {
        let start = start.map(parse_day_param).transpose()?.flatten();
        let end = match end.map(parse_day_param).transpose()?.flatten() {
            Some(day) => Some(next_day(day, end.unwrap_or_default())?),
            None => None,
        };
        Ok(Self { start, end })
    }

    /// Build a window from inclusive first and last days.
    ///
    /// # Errors
    ///
    /// Fails only if `last` is the final representable date.
    pub fn inclusive(
        first: Option<NaiveDate>,
        last: Option<NaiveDate>,
    ) -> Result<Self, PipelineError> {
        let end = match last {
            Some(day) => Some(next_day(day, &day.to_string())?),
            None => None,
        };
        Ok(Self { start: first, end })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Raise the lower bound to `min` if it is unset or earlier.
    #[must_use]
    pub fn clamp_start(self, min: NaiveDate) -> Self {
        let start = match self.start {
            Some(start) if start >= min => start,
            _ => min,
        };
        Self {
            start: Some(start),
            ..self
        }
    }

    /// True when the window cannot contain any day.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start >= end)
    }

    /// True when `day` falls inside the window.
    #[must_use]
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day < end)
    }

    /// True when `ts` falls inside the window.
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let start_ok = self
            .start
            .map_or(true, |start| ts >= start.and_time(NaiveTime::MIN));
        let end_ok = self
            .end
            .map_or(true, |end| ts < end.and_time(NaiveTime::MIN));
        start_ok && end_ok
    }

    /// Lower bound as the `YYYY-MM-DD` string the query layer expects.
    #[must_use]
    pub fn start_param(&self) -> Option<String> {
        self.start.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Exclusive upper bound as a `YYYY-MM-DD` string.
    #[must_use]
    pub fn end_param(&self) -> Option<String> {
        self.end.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start_param().unwrap_or_else(|| "..".into());
        let end = self.end_param().unwrap_or_else(|| "..".into());
        write!(f, "[{start}, {end})")
    }
}

/// Parse one raw date parameter; empty strings mean "no bound".
fn parse_day_param(raw: &str) -> Result<Option<NaiveDate>, PipelineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let date_part = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| PipelineError::InvalidDateFormat {
            value: raw.to_string(),
        })
}

fn next_day(day: NaiveDate, raw: &str) -> Result<NaiveDate, PipelineError> {
    day.checked_add_days(Days::new(1))
        .ok_or_else(|| PipelineError::InvalidDateFormat {
            value: raw.to_string(),
        })
}
