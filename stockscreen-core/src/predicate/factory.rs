//! Declarative predicate definitions, e.g. one `[[filters]]` table in TOML.
//!
//! ```toml
//! [[filters]]
//! type = "ma_compare"
//! period1 = 5
//! period2 = 10
//! relation = "gt"
//!
//! [[filters]]
//! type = "williams_r"
//! period = 14
//! threshold = -80
//! relation = "lt"
//! sampling_period = "30m"
//!
//! [[filters]]
//! type = "compare"
//! left = "close"
//! right = "MA20"
//! relation = "gte"
//! ```

use serde::{Deserialize, Serialize};

use super::{GeneralComparison, MovingAverageCompare, Operand, Predicate, RawOperand, WilliamsRThreshold};
use crate::domain::SamplingPeriod;
use crate::error::BuildError;

fn default_gt() -> String {
    "gt".into()
}

fn default_lt() -> String {
    "lt".into()
}

fn default_sampling() -> String {
    SamplingPeriod::Daily.as_str().into()
}

/// Relations and sampling periods are kept as text so that bad values are
/// reported as `BuildError`s naming the offending string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateSpec {
    MaCompare {
        period1: usize,
        period2: usize,
        #[serde(default = "default_gt")]
        relation: String,
    },
    WilliamsR {
        period: usize,
        threshold: f64,
        #[serde(default = "default_lt")]
        relation: String,
        #[serde(default = "default_sampling", alias = "data_period")]
        sampling_period: String,
    },
    Compare {
        left: RawOperand,
        right: RawOperand,
        #[serde(default = "default_gt")]
        relation: String,
        #[serde(default = "default_sampling")]
        sampling_period: String,
    },
}

impl PredicateSpec {
    pub fn build(&self) -> Result<Box<dyn Predicate>, BuildError> {
        match self {
            PredicateSpec::MaCompare {
                period1,
                period2,
                relation,
            } => Ok(Box::new(MovingAverageCompare::new(
                *period1,
                *period2,
                relation.parse()?,
            )?)),
            PredicateSpec::WilliamsR {
                period,
                threshold,
                relation,
                sampling_period,
            } => Ok(Box::new(WilliamsRThreshold::new(
                *period,
                *threshold,
                relation.parse()?,
                sampling_period.parse()?,
            )?)),
            PredicateSpec::Compare {
                left,
                right,
                relation,
                sampling_period,
            } => Ok(Box::new(GeneralComparison::with_period(
                Operand::from_raw(left)?,
                Operand::from_raw(right)?,
                relation.parse()?,
                sampling_period.parse()?,
            ))),
        }
    }
}

/// Build every spec in order, stopping at the first error.
pub fn build_all(specs: &[PredicateSpec]) -> Result<Vec<Box<dyn Predicate>>, BuildError> {
    specs.iter().map(PredicateSpec::build).collect()
}
