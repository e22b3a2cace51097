//! Bar series: one symbol's bars at one sampling period, plus derived columns.
//!
//! Indicator columns are parallel `Vec<f64>`s aligned by index with `bars`.
//! `NaN` marks positions where a column is undefined (warm-up).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::bar::{Bar, Field};
use super::period::SamplingPeriod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    period: SamplingPeriod,
    bars: Vec<Bar>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl BarSeries {
    /// Build a series, sorting ascending by timestamp.
    ///
    /// Rows sharing a timestamp collapse to the last one supplied.
    pub fn new(symbol: impl Into<String>, period: SamplingPeriod, bars: Vec<Bar>) -> Self {
        let mut series = Self {
            symbol: symbol.into(),
            period,
            bars,
            columns: BTreeMap::new(),
        };
        series.canonicalize();
        series
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn period(&self) -> SamplingPeriod {
        self.period
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn is_sorted(&self) -> bool {
        self.bars
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp)
    }

    /// Sort ascending by timestamp and drop duplicate timestamps (keep last).
    ///
    /// Indicator columns are permuted along with the bars.
    pub fn canonicalize(&mut self) {
        if self.is_sorted() {
            return;
        }
        let n = self.bars.len();
        let mut order: Vec<usize> = (0..n).collect();
        // Stable sort keeps input order among equal timestamps, so the last
        // occurrence of a duplicate is the last index in its run.
        order.sort_by_key(|&i| self.bars[i].timestamp);
        let mut keep: Vec<usize> = Vec::with_capacity(n);
        for &i in &order {
            let duplicate = keep
                .last()
                .is_some_and(|&prev| self.bars[prev].timestamp == self.bars[i].timestamp);
            if duplicate {
                let last = keep.len() - 1;
                keep[last] = i;
            } else {
                keep.push(i);
            }
        }
        self.bars = keep.iter().map(|&i| self.bars[i].clone()).collect();
        for values in self.columns.values_mut() {
            let reordered: Vec<f64> = keep.iter().map(|&i| values[i]).collect();
            *values = reordered;
        }
    }

    /// Copy of this series with one more named column.
    ///
    /// # Panics
    /// Panics if `values` does not have one entry per bar.
    pub fn with_column(&self, name: impl Into<String>, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            self.bars.len(),
            "indicator column must align with bars"
        );
        let mut out = self.clone();
        out.columns.insert(name.into(), values);
        out
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Last-row value of a named column. `None` if the column is missing or
    /// the series is empty; the value itself may still be `NaN`.
    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.columns.get(name).and_then(|v| v.last().copied())
    }

    pub fn field_values(&self, field: Field) -> Vec<f64> {
        self.bars.iter().map(|b| b.field(field)).collect()
    }

    pub fn last_field(&self, field: Field) -> Option<f64> {
        self.bars.last().map(|b| b.field(field))
    }
}
