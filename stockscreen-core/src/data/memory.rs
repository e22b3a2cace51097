//! In-memory feed holding pre-built bars, keyed by symbol and sampling period.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::feed::{DataError, DataFeed};
use crate::domain::{Adjustment, Bar, BarSeries, SamplingPeriod};

#[derive(Debug, Default, Clone)]
pub struct MemoryFeed {
    bars: HashMap<(String, SamplingPeriod), Vec<Bar>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bars for a canonical symbol. Replaces anything already stored.
    pub fn insert(&mut self, symbol: impl Into<String>, period: SamplingPeriod, bars: Vec<Bar>) {
        self.bars.insert((symbol.into(), period), bars);
    }

    pub fn with(mut self, symbol: impl Into<String>, period: SamplingPeriod, bars: Vec<Bar>) -> Self {
        self.insert(symbol, period, bars);
        self
    }
}

impl DataFeed for MemoryFeed {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        period: SamplingPeriod,
        _adjustment: Adjustment,
    ) -> Result<Option<BarSeries>, DataError> {
        let Some(bars) = self.bars.get(&(symbol.to_string(), period)) else {
            return Ok(None);
        };
        let in_range: Vec<Bar> = bars
            .iter()
            .filter(|b| {
                let day = b.timestamp.date();
                day >= start && day <= end
            })
            .cloned()
            .collect();
        if in_range.is_empty() {
            return Ok(None);
        }
        Ok(Some(BarSeries::new(symbol, period, in_range)))
    }
}
