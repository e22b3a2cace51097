//! Indicator library.
//!
//! Indicators are pure functions: bar history in, numeric series out. The
//! output has one value per bar; the first `lookback()` values are `NaN`.
//! `calculate` wraps `compute` with the copy-on-write contract callers rely
//! on: the input series is never touched, the returned series is sorted and
//! carries one extra column named after the indicator.

pub mod moving_average;
pub mod spec;
pub mod williams_r;

pub use moving_average::MovingAverage;
pub use spec::{IndicatorKind, IndicatorSpec};
pub use williams_r::{WilliamsR, ZERO_RANGE_VALUE};

use crate::domain::{Bar, BarSeries};

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Column name, e.g. `"MA5"` or `"WR14"`.
    fn name(&self) -> &str;

    /// Number of leading bars that cannot carry a value.
    fn lookback(&self) -> usize;

    /// Compute over bars assumed ascending by timestamp.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Copy `series`, sort it, and append this indicator's column.
    fn calculate(&self, series: &BarSeries) -> BarSeries {
        let mut sorted = series.clone();
        sorted.canonicalize();
        let values = self.compute(sorted.bars());
        sorted.with_column(self.name(), values)
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high = max(open, close) + 1,
/// low = min(open, close) - 1, one bar per day from 2025-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2025, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
                amount: close * 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
