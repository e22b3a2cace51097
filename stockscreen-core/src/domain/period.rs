//! Sampling period and price adjustment enums shared by feeds and predicates.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

/// Bar interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplingPeriod {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "1d")]
    Daily,
}

impl SamplingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingPeriod::OneMinute => "1m",
            SamplingPeriod::FiveMinutes => "5m",
            SamplingPeriod::ThirtyMinutes => "30m",
            SamplingPeriod::Daily => "1d",
        }
    }

    /// Wall-clock length of one intraday bar. `None` for daily bars.
    pub fn intraday_step(&self) -> Option<Duration> {
        match self {
            SamplingPeriod::OneMinute => Some(Duration::minutes(1)),
            SamplingPeriod::FiveMinutes => Some(Duration::minutes(5)),
            SamplingPeriod::ThirtyMinutes => Some(Duration::minutes(30)),
            SamplingPeriod::Daily => None,
        }
    }
}

impl fmt::Display for SamplingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingPeriod {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(SamplingPeriod::OneMinute),
            "5m" => Ok(SamplingPeriod::FiveMinutes),
            "30m" => Ok(SamplingPeriod::ThirtyMinutes),
            "1d" => Ok(SamplingPeriod::Daily),
            other => Err(BuildError::UnknownSamplingPeriod(other.to_string())),
        }
    }
}

/// Dividend/split adjustment applied by the data provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    /// Forward-adjusted (the provider's "front" mode).
    #[default]
    Pre,
    /// Backward-adjusted.
    Post,
    #[serde(rename = "none")]
    Unadjusted,
}

impl Adjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Pre => "pre",
            Adjustment::Post => "post",
            Adjustment::Unadjusted => "none",
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Adjustment {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Adjustment::Pre),
            "post" => Ok(Adjustment::Post),
            "none" => Ok(Adjustment::Unadjusted),
            other => Err(BuildError::UnknownAdjustment(other.to_string())),
        }
    }
}
