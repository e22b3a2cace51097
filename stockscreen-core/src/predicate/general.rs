//! Arbitrary comparison between constants, raw fields and indicator values.
//!
//! Operand kind is fixed at construction by a prefix rule:
//! - strings starting with `MA` or `WR` are indicator references and must
//!   parse as one (`MA5`, `WR14`), otherwise `UnsupportedIndicator`;
//! - one of the six raw field names is a field reference;
//! - any other string is `UnknownOperand`;
//! - numbers are constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::{Comparison, Predicate, Verdict};
use crate::domain::{BarSeries, Field, SamplingPeriod};
use crate::error::BuildError;
use crate::indicators::IndicatorSpec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Constant(f64),
    Field(Field),
    Indicator(IndicatorSpec),
}

/// Operand as written in configuration: a bare number or a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOperand {
    Number(f64),
    Name(String),
}

impl Operand {
    /// Resolve an operand name by the prefix rule.
    pub fn parse(s: &str) -> Result<Self, BuildError> {
        if IndicatorSpec::has_indicator_prefix(s) {
            return s.parse().map(Operand::Indicator);
        }
        s.parse::<Field>()
            .map(Operand::Field)
            .map_err(|()| BuildError::UnknownOperand(s.to_string()))
    }

    pub fn from_raw(raw: &RawOperand) -> Result<Self, BuildError> {
        match raw {
            RawOperand::Number(v) => Ok(Operand::Constant(*v)),
            RawOperand::Name(s) => Self::parse(s),
        }
    }

    pub fn required_history(&self) -> usize {
        match self {
            Operand::Indicator(spec) => spec.required_history(),
            Operand::Constant(_) | Operand::Field(_) => 1,
        }
    }

    /// Last-row value on `series`. Indicators are computed on a private copy.
    /// `None` when the series is empty.
    pub fn resolve(&self, series: &BarSeries) -> Option<f64> {
        match self {
            Operand::Constant(v) => Some(*v),
            Operand::Field(field) => series.last_field(*field),
            Operand::Indicator(spec) => {
                let indicator = spec.build();
                indicator
                    .calculate(series)
                    .last_value(&spec.column())
            }
        }
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Constant(v)
    }
}

impl From<Field> for Operand {
    fn from(field: Field) -> Self {
        Operand::Field(field)
    }
}

impl From<IndicatorSpec> for Operand {
    fn from(spec: IndicatorSpec) -> Self {
        Operand::Indicator(spec)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(v) => write!(f, "{v}"),
            Operand::Field(field) => write!(f, "{field}"),
            Operand::Indicator(spec) => write!(f, "{spec}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneralComparison {
    left: Operand,
    right: Operand,
    relation: Comparison,
    period: SamplingPeriod,
    name: String,
}

impl GeneralComparison {
    /// Daily-bar comparison.
    pub fn new(left: impl Into<Operand>, right: impl Into<Operand>, relation: Comparison) -> Self {
        Self::with_period(left, right, relation, SamplingPeriod::Daily)
    }

    pub fn with_period(
        left: impl Into<Operand>,
        right: impl Into<Operand>,
        relation: Comparison,
        period: SamplingPeriod,
    ) -> Self {
        let left = left.into();
        let right = right.into();
        let name = format!("GeneralComparison_{left}_{relation}_{right}");
        Self {
            left,
            right,
            relation,
            period,
            name,
        }
    }

    /// Build from operand names, e.g. `("close", "MA5", "gt")`.
    pub fn parse(left: &str, right: &str, relation: &str) -> Result<Self, BuildError> {
        Ok(Self::new(
            Operand::parse(left)?,
            Operand::parse(right)?,
            relation.parse()?,
        ))
    }

    pub fn left(&self) -> Operand {
        self.left
    }

    pub fn right(&self) -> Operand {
        self.right
    }

    pub fn relation(&self) -> Comparison {
        self.relation
    }
}

impl Predicate for GeneralComparison {
    fn name(&self) -> &str {
        &self.name
    }

    fn sampling_period(&self) -> SamplingPeriod {
        self.period
    }

    fn required_history(&self) -> usize {
        self.left
            .required_history()
            .max(self.right.required_history())
    }

    fn verdict(&self, series: &BarSeries) -> Verdict {
        let (Some(l), Some(r)) = (self.left.resolve(series), self.right.resolve(series)) else {
            return Verdict::Insufficient;
        };
        if l.is_nan() || r.is_nan() {
            return Verdict::Insufficient;
        }
        let pass = self.relation.holds(l, r);
        debug!(
            symbol = series.symbol(),
            "{} {l} {} {} {r}: {}",
            self.left,
            self.relation.symbol(),
            self.right,
            if pass { "pass" } else { "fail" }
        );
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}
