//! Bounded worker-pool bulk download.
//!
//! Every symbol is fetched independently on a dedicated rayon pool of
//! `max_threads` workers. A failure for one symbol is logged and recorded as
//! `None`; it never stops the others. The call returns once every symbol has
//! been attempted.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{info, warn};

use super::feed::{fetch_symbol, DataError, DataFeed, Fetched};
use crate::domain::{Adjustment, BarSeries, SamplingPeriod, TimeRange};

/// Outcome of one symbol's fetch, as reported to progress callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded { bars: usize },
    NoData,
    Failed(String),
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded { .. })
    }
}

/// Progress callback for multi-symbol downloads.
///
/// Callbacks fire from worker threads, so implementations must be `Sync`.
pub trait DownloadProgress: Send + Sync {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: &FetchOutcome);

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Reports progress as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] fetching {symbol}", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Loaded { bars } => {
                info!("[{}/{}] {symbol}: {bars} bars", index + 1, total)
            }
            FetchOutcome::NoData => warn!("[{}/{}] {symbol}: no data", index + 1, total),
            FetchOutcome::Failed(reason) => {
                warn!("[{}/{}] {symbol}: failed: {reason}", index + 1, total)
            }
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        info!(succeeded, failed, total, "download finished");
    }
}

/// Result of a bulk download.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Keyed by the symbol as supplied by the caller. `None` marks a symbol
    /// that yielded no data or failed.
    pub data: HashMap<String, Option<BarSeries>>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn series(&self, symbol: &str) -> Option<&BarSeries> {
        self.data.get(symbol).and_then(|s| s.as_ref())
    }
}

fn fetch_one(
    feed: &dyn DataFeed,
    symbol: &str,
    range: TimeRange,
    period: SamplingPeriod,
    adjustment: Adjustment,
) -> (Option<BarSeries>, FetchOutcome) {
    match fetch_symbol(feed, symbol, range, period, adjustment) {
        Ok(Fetched::Series(series)) => {
            let bars = series.len();
            (Some(series), FetchOutcome::Loaded { bars })
        }
        Ok(Fetched::NoData) => (None, FetchOutcome::NoData),
        Ok(Fetched::InvalidSymbol) => (None, FetchOutcome::Failed("invalid symbol".into())),
        Err(e) => (None, FetchOutcome::Failed(e.to_string())),
    }
}

/// Fetch every symbol on a pool of `max_threads` workers (at least one).
///
/// Errors only if the worker pool cannot be created.
pub fn download_all(
    feed: &dyn DataFeed,
    symbols: &[String],
    range: TimeRange,
    period: SamplingPeriod,
    adjustment: Adjustment,
    max_threads: usize,
    progress: &dyn DownloadProgress,
) -> Result<DownloadSummary, DataError> {
    let workers = max_threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("download-{i}"))
        .build()
        .map_err(|e| DataError::Other(format!("failed to start download pool: {e}")))?;

    let total = symbols.len();
    info!(total, workers, %range, %period, feed = feed.name(), "starting download");

    let results: Vec<(String, Option<BarSeries>, FetchOutcome)> = pool.install(|| {
        symbols
            .par_iter()
            .enumerate()
            .map(|(index, symbol)| {
                progress.on_start(symbol, index, total);
                let (series, outcome) = fetch_one(feed, symbol, range, period, adjustment);
                progress.on_complete(symbol, index, total, &outcome);
                (symbol.clone(), series, outcome)
            })
            .collect()
    });

    let mut summary = DownloadSummary {
        total,
        ..DownloadSummary::default()
    };
    for (symbol, series, outcome) in results {
        if outcome.is_loaded() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        summary.data.insert(symbol, series);
    }
    progress.on_batch_complete(summary.succeeded, summary.failed, total);
    Ok(summary)
}
