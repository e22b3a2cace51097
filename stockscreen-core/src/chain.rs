//! Filter chain: ordered predicates applied cumulatively to a candidate set.
//!
//! Each stage only sees the survivors of the previous one, so the result is
//! always a subset of the input, in input order. The chain stops early once
//! nothing is left.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::data::DataFeed;
use crate::domain::{Adjustment, TimeRange};
use crate::predicate::{EvalContext, Predicate, PredicateError};

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("filter '{name}' failed: {source}")]
    PredicateFailed {
        name: String,
        #[source]
        source: PredicateError,
    },
}

/// Candidate counts around one predicate of the last `screen` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub name: String,
    pub input: usize,
    pub passed: usize,
}

pub struct FilterChain {
    feed: Arc<dyn DataFeed>,
    range: TimeRange,
    adjustment: Adjustment,
    parallel: bool,
    filters: Vec<Box<dyn Predicate>>,
    filtered: Vec<String>,
    stages: Vec<StageReport>,
}

impl FilterChain {
    pub fn new(feed: Arc<dyn DataFeed>, range: TimeRange) -> Self {
        Self {
            feed,
            range,
            adjustment: Adjustment::default(),
            parallel: false,
            filters: Vec::new(),
            filtered: Vec::new(),
            stages: Vec::new(),
        }
    }

    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    /// Evaluate symbols within each predicate on the rayon global pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn add_filter(&mut self, predicate: Box<dyn Predicate>) -> &mut Self {
        debug!(name = predicate.name(), "filter added");
        self.filters.push(predicate);
        self
    }

    /// Remove every predicate named `name`. Returns whether any was removed.
    pub fn remove_filter(&mut self, name: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|p| p.name() != name);
        let removed = self.filters.len() != before;
        if removed {
            debug!(name, "filter removed");
        } else {
            debug!(name, "no filter with that name");
        }
        removed
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn set_range(&mut self, range: TimeRange) {
        self.range = range;
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn adjustment(&self) -> Adjustment {
        self.adjustment
    }

    pub fn feed_name(&self) -> &str {
        self.feed.name()
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Largest bar count any predicate needs for a defined last row.
    pub fn required_history(&self) -> usize {
        self.filters
            .iter()
            .map(|p| p.required_history())
            .max()
            .unwrap_or(0)
    }

    /// Result of the last successful `screen`.
    pub fn filtered_symbols(&self) -> &[String] {
        &self.filtered
    }

    /// Per-stage counts of the last `screen`, in execution order. Stages
    /// skipped after the candidate set emptied are absent.
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Run every predicate in insertion order over `symbols`.
    pub fn screen(&mut self, symbols: &[String]) -> Result<Vec<String>, ScreenError> {
        self.filtered.clear();
        self.stages.clear();

        info!(
            symbols = symbols.len(),
            filters = self.filters.len(),
            range = %self.range,
            feed = self.feed.name(),
            "screening"
        );
        if self.filters.is_empty() {
            self.filtered = symbols.to_vec();
            return Ok(self.filtered.clone());
        }
        debug!(
            required_history = self.required_history(),
            "bars needed for every filter to be defined"
        );

        let ctx = EvalContext {
            feed: self.feed.as_ref(),
            range: self.range,
            adjustment: self.adjustment,
            parallel: self.parallel,
        };

        let mut candidates = symbols.to_vec();
        for (i, predicate) in self.filters.iter().enumerate() {
            let input = candidates.len();
            let passed = predicate.filter(&candidates, &ctx).map_err(|source| {
                error!(filter = predicate.name(), error = %source, "filter failed, aborting screen");
                ScreenError::PredicateFailed {
                    name: predicate.name().to_string(),
                    source,
                }
            })?;

            let keep: HashSet<&str> = passed.iter().map(String::as_str).collect();
            candidates.retain(|s| keep.contains(s.as_str()));
            self.stages.push(StageReport {
                name: predicate.name().to_string(),
                input,
                passed: candidates.len(),
            });
            info!(
                filter = predicate.name(),
                input,
                passed = candidates.len(),
                "stage done"
            );

            if candidates.is_empty() {
                let skipped = self.filters.len() - i - 1;
                if skipped > 0 {
                    info!(skipped, "no candidates left, skipping remaining filters");
                }
                break;
            }
        }

        info!(passed = candidates.len(), "screen finished");
        self.filtered = candidates.clone();
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataError, MemoryFeed};
    use crate::domain::{BarSeries, SamplingPeriod};
    use crate::indicators::make_bars;
    use crate::predicate::{Comparison, GeneralComparison, Verdict};
    use chrono::NaiveDate;

    fn range() -> TimeRange {
        TimeRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn feed() -> Arc<dyn DataFeed> {
        Arc::new(
            MemoryFeed::new()
                .with("600000.SH", SamplingPeriod::Daily, make_bars(&[10.0, 20.0]))
                .with("000001.SZ", SamplingPeriod::Daily, make_bars(&[10.0, 5.0]))
                .with("300750.SZ", SamplingPeriod::Daily, make_bars(&[10.0, 30.0])),
        )
    }

    /// Always fails with the given feed error.
    struct Broken;

    impl Predicate for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn sampling_period(&self) -> SamplingPeriod {
            SamplingPeriod::Daily
        }
        fn required_history(&self) -> usize {
            1
        }
        fn verdict(&self, _series: &BarSeries) -> Verdict {
            Verdict::Pass
        }
        fn filter(
            &self,
            _symbols: &[String],
            _ctx: &EvalContext<'_>,
        ) -> Result<Vec<String>, PredicateError> {
            Err(PredicateError::Feed {
                source: DataError::ProviderUnavailable("terminal offline".into()),
            })
        }
    }

    #[test]
    fn no_filters_returns_input() {
        let mut chain = FilterChain::new(feed(), range());
        let input = symbols(&["b", "a"]);
        assert_eq!(chain.screen(&input).unwrap(), input);
        assert!(chain.stages().is_empty());
        assert_eq!(chain.feed_name(), "memory");
    }

    #[test]
    fn stages_shrink_in_order() {
        let mut chain = FilterChain::new(feed(), range());
        chain
            .add_filter(Box::new(GeneralComparison::new(
                crate::domain::Field::Close,
                8.0,
                Comparison::Gt,
            )))
            .add_filter(Box::new(GeneralComparison::new(
                crate::domain::Field::Close,
                25.0,
                Comparison::Gt,
            )));
        let out = chain
            .screen(&symbols(&["300750", "000001", "600000"]))
            .unwrap();
        assert_eq!(out, symbols(&["300750"]));
        assert_eq!(chain.filtered_symbols(), out.as_slice());
        assert_eq!(
            chain.stages(),
            &[
                StageReport {
                    name: "GeneralComparison_close_gt_8".into(),
                    input: 3,
                    passed: 2
                },
                StageReport {
                    name: "GeneralComparison_close_gt_25".into(),
                    input: 2,
                    passed: 1
                },
            ]
        );
    }

    #[test]
    fn empty_set_skips_later_filters() {
        let mut chain = FilterChain::new(feed(), range());
        chain
            .add_filter(Box::new(GeneralComparison::new(
                crate::domain::Field::Close,
                1000.0,
                Comparison::Gt,
            )))
            .add_filter(Box::new(Broken));
        let out = chain.screen(&symbols(&["600000"])).unwrap();
        assert!(out.is_empty());
        assert_eq!(chain.stages().len(), 1);
    }

    #[test]
    fn predicate_failure_names_the_filter() {
        let mut chain = FilterChain::new(feed(), range());
        chain.add_filter(Box::new(Broken));
        let err = chain.screen(&symbols(&["600000"])).unwrap_err();
        let ScreenError::PredicateFailed { name, .. } = &err;
        assert_eq!(name, "broken");
        assert!(err.to_string().contains("terminal offline"));
        assert!(chain.filtered_symbols().is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let mut chain = FilterChain::new(feed(), range());
        chain
            .add_filter(Box::new(Broken))
            .add_filter(Box::new(GeneralComparison::new(
                crate::domain::Field::Close,
                1.0,
                Comparison::Gt,
            )));
        assert_eq!(
            chain.filter_names(),
            vec!["broken", "GeneralComparison_close_gt_1"]
        );
        assert!(chain.remove_filter("broken"));
        assert!(!chain.remove_filter("broken"));
        assert_eq!(chain.len(), 1);
        chain.clear_filters();
        assert!(chain.is_empty());
        assert_eq!(chain.required_history(), 0);
    }
}
