//! Williams %R: close's position within the trailing high/low range.
//!
//! WR[t] = (HH - close[t]) / (HH - LL) * -100, where HH/LL are the highest
//! high and lowest low over bars [t-period+1, t]. Range is [-100, 0].
//! A flat window (HH == LL) carries no information and maps to -50.
//!
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

/// Value emitted when the window's high equals its low.
pub const ZERO_RANGE_VALUE: f64 = -50.0;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    /// # Panics
    /// Panics if `period` is zero.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "WR period must be >= 1");
        Self {
            period,
            name: format!("WR{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[(i + 1 - self.period)..=i];
            let mut hh = f64::NEG_INFINITY;
            let mut ll = f64::INFINITY;
            let mut has_nan = false;
            for bar in window {
                if bar.high.is_nan() || bar.low.is_nan() {
                    has_nan = true;
                    break;
                }
                hh = hh.max(bar.high);
                ll = ll.min(bar.low);
            }
            let close = bars[i].close;
            result[i] = if has_nan || close.is_nan() {
                f64::NAN
            } else if hh == ll {
                ZERO_RANGE_VALUE
            } else {
                (hh - close) / (hh - ll) * -100.0
            };
        }

        result
    }
}
