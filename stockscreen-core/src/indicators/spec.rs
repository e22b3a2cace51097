//! Indicator references such as `"MA5"` or `"WR14"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{Indicator, MovingAverage, WilliamsR};
use crate::error::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    MovingAverage,
    WilliamsR,
}

impl IndicatorKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IndicatorKind::MovingAverage => "MA",
            IndicatorKind::WilliamsR => "WR",
        }
    }
}

/// A (kind, period) pair. Stateless; build as many indicators from it as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub period: usize,
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind, period: usize) -> Result<Self, BuildError> {
        if period == 0 {
            return Err(BuildError::InvalidPeriod {
                what: kind.prefix(),
                period,
            });
        }
        Ok(Self { kind, period })
    }

    pub fn moving_average(period: usize) -> Result<Self, BuildError> {
        Self::new(IndicatorKind::MovingAverage, period)
    }

    pub fn williams_r(period: usize) -> Result<Self, BuildError> {
        Self::new(IndicatorKind::WilliamsR, period)
    }

    /// Whether `s` is claimed by the indicator prefix rule (starts with MA or WR),
    /// regardless of whether the remainder parses.
    pub fn has_indicator_prefix(s: &str) -> bool {
        s.starts_with("MA") || s.starts_with("WR")
    }

    /// Name of the column this indicator writes.
    pub fn column(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.period)
    }

    /// Bars needed before the last row carries a value.
    pub fn required_history(&self) -> usize {
        self.period
    }

    pub fn build(&self) -> Box<dyn Indicator> {
        match self.kind {
            IndicatorKind::MovingAverage => Box::new(MovingAverage::new(self.period)),
            IndicatorKind::WilliamsR => Box::new(WilliamsR::new(self.period)),
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.period)
    }
}

impl FromStr for IndicatorSpec {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || BuildError::UnsupportedIndicator(s.to_string());
        let (kind, digits) = if let Some(rest) = s.strip_prefix("MA") {
            (IndicatorKind::MovingAverage, rest)
        } else if let Some(rest) = s.strip_prefix("WR") {
            (IndicatorKind::WilliamsR, rest)
        } else {
            return Err(unsupported());
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unsupported());
        }
        let period: usize = digits.parse().map_err(|_| unsupported())?;
        Self::new(kind, period)
    }
}

impl Serialize for IndicatorSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IndicatorSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
