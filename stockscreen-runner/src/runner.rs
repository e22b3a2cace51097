//! Screen runner: wires config, symbol list, feed and chain together.
//!
//! Two entry points:
//! - `run_screen()`: load symbols, build the chain, screen, export results.
//! - `run_download()`: bulk-fetch every symbol on the bounded worker pool.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use stockscreen_core::data::{download_all, DataError, DownloadProgress, DownloadSummary};
use stockscreen_core::domain::{Adjustment, RangeError, SamplingPeriod};
use stockscreen_core::ScreenError;

use crate::config::{ConfigError, ScreenerConfig};
use crate::export::{write_summary_json, write_symbols_csv, ScreenSummary, SCHEMA_VERSION};
use crate::universe::{load_symbols, UniverseError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("symbol list error: {0}")]
    Universe(#[from] UniverseError),
    #[error("date range error: {0}")]
    Range(#[from] RangeError),
    #[error("screen aborted: {0}")]
    Screen(#[from] ScreenError),
    #[error("download error: {0}")]
    Data(#[from] DataError),
    #[error("failed to write {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

/// Command-line adjustments applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct ScreenOverrides {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub output_path: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
    /// `Some(true)` forces parallel evaluation; `None` keeps the config value.
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub summary: ScreenSummary,
    pub output_path: PathBuf,
    pub summary_path: Option<PathBuf>,
}

/// Run one screen end to end and write its outputs.
pub fn run_screen(
    config: &ScreenerConfig,
    overrides: &ScreenOverrides,
    today: NaiveDate,
) -> Result<ScreenOutcome, RunError> {
    let symbols = load_symbols(&config.symbols_path)?;
    let range = config.time_range(overrides.start, overrides.end, today)?;
    info!(symbols = symbols.len(), %range, "screen starting");

    let mut config = config.clone();
    if let Some(parallel) = overrides.parallel {
        config.parallel = parallel;
    }
    let mut chain = config.build_chain(range)?;
    let passed = chain.screen(&symbols)?;

    let summary = ScreenSummary {
        schema_version: SCHEMA_VERSION,
        range,
        adjustment: chain.adjustment().to_string(),
        feed: chain.feed_name().to_string(),
        filters: chain.filter_names().iter().map(|s| s.to_string()).collect(),
        stages: chain.stages().to_vec(),
        input_count: symbols.len(),
        passed,
    };

    let output_path = overrides
        .output_path
        .clone()
        .unwrap_or_else(|| config.output_path.clone());
    write_symbols_csv(&summary.passed, &output_path).map_err(|e| RunError::Export {
        path: output_path.clone(),
        reason: format!("{e:#}"),
    })?;
    info!(path = %output_path.display(), passed = summary.passed.len(), "results written");

    let summary_path = overrides
        .summary_path
        .clone()
        .or_else(|| config.summary_path.clone());
    if let Some(path) = &summary_path {
        write_summary_json(&summary, path).map_err(|e| RunError::Export {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?;
        info!(path = %path.display(), "summary written");
    }

    Ok(ScreenOutcome {
        summary,
        output_path,
        summary_path,
    })
}

/// Options for a bulk download run.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub period: SamplingPeriod,
    /// `None` keeps the configured adjustment.
    pub adjustment: Option<Adjustment>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Fetch every listed symbol on a pool of `config.max_threads` workers.
pub fn run_download(
    config: &ScreenerConfig,
    opts: &DownloadOptions,
    today: NaiveDate,
    progress: &dyn DownloadProgress,
) -> Result<DownloadSummary, RunError> {
    let symbols = load_symbols(&config.symbols_path)?;
    let range = config.time_range(opts.start, opts.end, today)?;
    let adjustment = opts.adjustment.unwrap_or(config.adjustment);
    let feed = config.feed.build();
    let summary = download_all(
        feed.as_ref(),
        &symbols,
        range,
        opts.period,
        adjustment,
        config.max_threads,
        progress,
    )?;
    Ok(summary)
}
