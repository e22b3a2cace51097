//! Inclusive date range bound to a screening run.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Look-back applied when one side of the range is left open.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Inclusive `[start, end]` calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Fill in missing bounds relative to `today`.
    ///
    /// - neither bound: the trailing 180 days ending today
    /// - start only: start through today
    /// - end only: the 180 days ending at `end`
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, RangeError> {
        let lookback = Duration::days(DEFAULT_LOOKBACK_DAYS);
        let (start, end) = match (start, end) {
            (None, None) => (today - lookback, today),
            (Some(s), None) => (s, today),
            (None, Some(e)) => (e - lookback, e),
            (Some(s), Some(e)) => (s, e),
        };
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
