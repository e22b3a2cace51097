//! Data feed trait and structured error types.
//!
//! `DataFeed` abstracts the price-history source (vendor terminal, CSV
//! directory, synthetic generator) so predicates and the bulk downloader can
//! be driven by anything, including test doubles.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::domain::{normalize_symbol, Adjustment, BarSeries, SamplingPeriod, TimeRange};

/// Structured error types for data operations.
///
/// "No data" is not an error: feeds return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("malformed data for {symbol}: {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The provider as a whole cannot serve requests.
    #[error("data provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for price-history sources.
pub trait DataFeed: Send + Sync {
    /// Human-readable name of this feed.
    fn name(&self) -> &str;

    /// Fetch bars for a canonical symbol (`NNNNNN.SH` / `NNNNNN.SZ`) over an
    /// inclusive date range.
    ///
    /// Returns `Ok(None)` when the source has nothing for the request.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        period: SamplingPeriod,
        adjustment: Adjustment,
    ) -> Result<Option<BarSeries>, DataError>;

    /// Whether the feed can serve requests at all. Checked once per
    /// predicate run, before any symbol is fetched.
    fn check_ready(&self) -> Result<(), DataError> {
        Ok(())
    }
}

/// Result of resolving one user-supplied symbol through normalization and a feed.
#[derive(Debug)]
pub enum Fetched {
    Series(BarSeries),
    NoData,
    InvalidSymbol,
}

/// Normalize `raw` and fetch it. Empty series are reported as `NoData`.
pub fn fetch_symbol(
    feed: &dyn DataFeed,
    raw: &str,
    range: TimeRange,
    period: SamplingPeriod,
    adjustment: Adjustment,
) -> Result<Fetched, DataError> {
    let Some(symbol) = normalize_symbol(raw) else {
        return Ok(Fetched::InvalidSymbol);
    };
    match feed.fetch(&symbol, range.start, range.end, period, adjustment)? {
        Some(series) if !series.is_empty() => {
            debug!(%symbol, bars = series.len(), %period, feed = feed.name(), "fetched");
            Ok(Fetched::Series(series))
        }
        _ => Ok(Fetched::NoData),
    }
}
