//! Screening predicates.
//!
//! A predicate decides, from the last row of one symbol's bar series, whether
//! the symbol stays in the candidate set. `verdict` is the pure part; the
//! provided `filter` runs the shared per-symbol loop (normalize, fetch,
//! evaluate) over a whole candidate list.

pub mod comparison;
pub mod factory;
pub mod general;
pub mod ma_compare;
pub mod williams_r;

pub use comparison::Comparison;
pub use factory::PredicateSpec;
pub use general::{GeneralComparison, Operand, RawOperand};
pub use ma_compare::MovingAverageCompare;
pub use williams_r::WilliamsRThreshold;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{fetch_symbol, DataError, DataFeed, Fetched};
use crate::domain::{Adjustment, BarSeries, SamplingPeriod, TimeRange};

/// Outcome of evaluating one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// A value needed for the comparison is undefined at the last row.
    Insufficient,
}

/// Failure of a predicate as a whole, as opposed to one symbol. Aborts the
/// chain it runs in.
#[derive(Debug, Error)]
pub enum PredicateError {
    #[error("data feed failed: {source}")]
    Feed {
        #[source]
        source: DataError,
    },
}

/// Everything a predicate needs besides its own parameters.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub feed: &'a dyn DataFeed,
    pub range: TimeRange,
    pub adjustment: Adjustment,
    pub parallel: bool,
}

impl<'a> EvalContext<'a> {
    pub fn new(feed: &'a dyn DataFeed, range: TimeRange) -> Self {
        Self {
            feed,
            range,
            adjustment: Adjustment::default(),
            parallel: false,
        }
    }
}

/// Trait for screening predicates.
pub trait Predicate: Send + Sync {
    /// Stable name, used by `FilterChain::remove_filter` and in logs.
    fn name(&self) -> &str;

    /// Bar granularity this predicate fetches.
    fn sampling_period(&self) -> SamplingPeriod;

    /// Minimum bar count for the last row to carry every value compared.
    fn required_history(&self) -> usize;

    /// Evaluate one already-fetched series.
    fn verdict(&self, series: &BarSeries) -> Verdict;

    /// Subset of `symbols` that pass, in input order.
    fn filter(&self, symbols: &[String], ctx: &EvalContext<'_>) -> Result<Vec<String>, PredicateError> {
        evaluate_symbols(self, symbols, ctx)
    }
}

fn judge<P: Predicate + ?Sized>(predicate: &P, symbol: &str, ctx: &EvalContext<'_>) -> bool {
    let fetched = fetch_symbol(
        ctx.feed,
        symbol,
        ctx.range,
        predicate.sampling_period(),
        ctx.adjustment,
    );
    match fetched {
        Ok(Fetched::Series(series)) => match predicate.verdict(&series) {
            Verdict::Pass => true,
            Verdict::Fail => false,
            Verdict::Insufficient => {
                debug!(
                    %symbol,
                    predicate = predicate.name(),
                    bars = series.len(),
                    needed = predicate.required_history(),
                    "insufficient history"
                );
                false
            }
        },
        Ok(Fetched::NoData) => {
            debug!(%symbol, predicate = predicate.name(), "no data");
            false
        }
        Ok(Fetched::InvalidSymbol) => {
            warn!(%symbol, predicate = predicate.name(), "invalid symbol, skipped");
            false
        }
        Err(e) => {
            warn!(%symbol, predicate = predicate.name(), error = %e, "fetch failed, skipped");
            false
        }
    }
}

/// Per-symbol loop shared by every predicate.
///
/// Missing data, invalid symbols, fetch errors and undefined values each drop
/// only the symbol concerned. The predicate fails as a whole only when the
/// feed reports itself unusable before any symbol is fetched.
pub fn evaluate_symbols<P: Predicate + ?Sized>(
    predicate: &P,
    symbols: &[String],
    ctx: &EvalContext<'_>,
) -> Result<Vec<String>, PredicateError> {
    info!(
        predicate = predicate.name(),
        candidates = symbols.len(),
        period = %predicate.sampling_period(),
        "running filter"
    );

    ctx.feed
        .check_ready()
        .map_err(|source| PredicateError::Feed { source })?;

    let verdicts: Vec<bool> = if ctx.parallel {
        symbols.par_iter().map(|s| judge(predicate, s, ctx)).collect()
    } else {
        symbols.iter().map(|s| judge(predicate, s, ctx)).collect()
    };

    let passed: Vec<String> = symbols
        .iter()
        .zip(verdicts)
        .filter_map(|(symbol, keep)| keep.then(|| symbol.clone()))
        .collect();

    info!(predicate = predicate.name(), passed = passed.len(), "filter done");
    Ok(passed)
}
