//! Williams %R threshold: WR{p} gt/lt a fixed level, at any sampling period.

use tracing::debug;

use super::{Comparison, Predicate, Verdict};
use crate::domain::{BarSeries, SamplingPeriod};
use crate::error::BuildError;
use crate::indicators::{Indicator, WilliamsR};

#[derive(Debug, Clone)]
pub struct WilliamsRThreshold {
    indicator: WilliamsR,
    threshold: f64,
    relation: Comparison,
    period: SamplingPeriod,
    name: String,
}

impl WilliamsRThreshold {
    pub fn new(
        wr_period: usize,
        threshold: f64,
        relation: Comparison,
        period: SamplingPeriod,
    ) -> Result<Self, BuildError> {
        if wr_period == 0 {
            return Err(BuildError::InvalidPeriod {
                what: "WR",
                period: wr_period,
            });
        }
        if !relation.is_strict() {
            return Err(BuildError::UnsupportedRelation {
                predicate: "WilliamsRThreshold",
                relation: relation.to_string(),
            });
        }
        Ok(Self {
            indicator: WilliamsR::new(wr_period),
            threshold,
            relation,
            period,
            name: format!("WR{wr_period}_{period}"),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn relation(&self) -> Comparison {
        self.relation
    }
}

impl Predicate for WilliamsRThreshold {
    fn name(&self) -> &str {
        &self.name
    }

    fn sampling_period(&self) -> SamplingPeriod {
        self.period
    }

    fn required_history(&self) -> usize {
        self.indicator.period()
    }

    fn verdict(&self, series: &BarSeries) -> Verdict {
        let with_wr = self.indicator.calculate(series);
        let wr = match with_wr.last_value(self.indicator.name()) {
            Some(v) if !v.is_nan() => v,
            _ => return Verdict::Insufficient,
        };
        let pass = self.relation.holds(wr, self.threshold);
        debug!(
            symbol = series.symbol(),
            "{} {wr} {} {}: {}",
            self.indicator.name(),
            self.relation.symbol(),
            self.threshold,
            if pass { "pass" } else { "fail" }
        );
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}
