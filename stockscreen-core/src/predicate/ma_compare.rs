//! Moving-average relationship on daily bars: MA{p1} gt/lt MA{p2}.

use tracing::debug;

use super::{Comparison, Predicate, Verdict};
use crate::domain::{BarSeries, SamplingPeriod};
use crate::error::BuildError;
use crate::indicators::{Indicator, MovingAverage};

#[derive(Debug, Clone)]
pub struct MovingAverageCompare {
    fast: MovingAverage,
    slow: MovingAverage,
    relation: Comparison,
    name: String,
}

impl MovingAverageCompare {
    pub fn new(period1: usize, period2: usize, relation: Comparison) -> Result<Self, BuildError> {
        for period in [period1, period2] {
            if period == 0 {
                return Err(BuildError::InvalidPeriod { what: "MA", period });
            }
        }
        if !relation.is_strict() {
            return Err(BuildError::UnsupportedRelation {
                predicate: "MovingAverageCompare",
                relation: relation.to_string(),
            });
        }
        Ok(Self {
            fast: MovingAverage::new(period1),
            slow: MovingAverage::new(period2),
            relation,
            name: format!("MA{period1}_vs_MA{period2}"),
        })
    }

    pub fn periods(&self) -> (usize, usize) {
        (self.fast.period(), self.slow.period())
    }

    pub fn relation(&self) -> Comparison {
        self.relation
    }
}

impl Predicate for MovingAverageCompare {
    fn name(&self) -> &str {
        &self.name
    }

    fn sampling_period(&self) -> SamplingPeriod {
        SamplingPeriod::Daily
    }

    fn required_history(&self) -> usize {
        self.fast.period().max(self.slow.period())
    }

    fn verdict(&self, series: &BarSeries) -> Verdict {
        let with_fast = self.fast.calculate(series);
        let with_both = self.slow.calculate(&with_fast);
        let (Some(a), Some(b)) = (
            with_both.last_value(self.fast.name()),
            with_both.last_value(self.slow.name()),
        ) else {
            return Verdict::Insufficient;
        };
        if a.is_nan() || b.is_nan() {
            return Verdict::Insufficient;
        }
        let pass = self.relation.holds(a, b);
        debug!(
            symbol = series.symbol(),
            "{} {a} {} {} {b}: {}",
            self.fast.name(),
            self.relation.symbol(),
            self.slow.name(),
            if pass { "pass" } else { "fail" }
        );
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn series(closes: &[f64]) -> BarSeries {
        BarSeries::new("600519.SH", SamplingPeriod::Daily, make_bars(closes))
    }

    #[test]
    fn name_follows_periods() {
        let p = MovingAverageCompare::new(5, 20, Comparison::Lt).unwrap();
        assert_eq!(p.name(), "MA5_vs_MA20");
        assert_eq!(p.required_history(), 20);
        assert_eq!(p.periods(), (5, 20));
    }

    #[test]
    fn rising_closes_put_fast_above_slow() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let gt = MovingAverageCompare::new(2, 5, Comparison::Gt).unwrap();
        let lt = MovingAverageCompare::new(2, 5, Comparison::Lt).unwrap();
        assert_eq!(gt.verdict(&series(&closes)), Verdict::Pass);
        assert_eq!(lt.verdict(&series(&closes)), Verdict::Fail);
    }

    #[test]
    fn equal_averages_fail_both_directions() {
        let flat = [10.0; 12];
        for rel in [Comparison::Gt, Comparison::Lt] {
            let p = MovingAverageCompare::new(3, 6, rel).unwrap();
            assert_eq!(p.verdict(&series(&flat)), Verdict::Fail);
        }
    }

    #[test]
    fn short_history_is_insufficient() {
        let p = MovingAverageCompare::new(5, 10, Comparison::Gt).unwrap();
        assert_eq!(p.verdict(&series(&[1.0; 9])), Verdict::Insufficient);
    }

    #[test]
    fn rejects_non_strict_relation_and_zero_period() {
        assert!(matches!(
            MovingAverageCompare::new(5, 10, Comparison::Gte),
            Err(BuildError::UnsupportedRelation { .. })
        ));
        assert!(matches!(
            MovingAverageCompare::new(0, 10, Comparison::Gt),
            Err(BuildError::InvalidPeriod { period: 0, .. })
        ));
    }
}
