//! Screener configuration loaded from TOML.
//!
//! ```toml
//! symbols_path = "data/stocks.csv"   # required: CSV with a stock_code column
//! max_threads = 8                    # required: download pool size
//! start = "2025-01-01"               # optional, see TimeRange::resolve
//! end = "2025-06-30"                 # optional
//! adjustment = "pre"                 # pre | post | none
//! output_path = "data/screened.csv"
//! summary_path = "data/summary.json" # optional JSON run summary
//! parallel = false                   # evaluate symbols in parallel per filter
//!
//! [feed]
//! kind = "csv"                       # or "synthetic" (with optional seed)
//! dir = "data/bars"
//!
//! [[filters]]
//! type = "compare"
//! left = "close"
//! right = "MA5"
//! relation = "gt"
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.
//! Leaving `[[filters]]` out entirely selects the default chain
//! (close above MA5, then WR14 on 30-minute bars below -80); an explicit
//! `filters = []` selects the empty chain.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use stockscreen_core::data::{CsvFeed, DataFeed, SyntheticFeed, DEFAULT_SEED};
use stockscreen_core::domain::{Adjustment, RangeError, TimeRange};
use stockscreen_core::predicate::{Predicate, PredicateSpec, RawOperand};
use stockscreen_core::{BuildError, FilterChain};

pub const DEFAULT_OUTPUT_PATH: &str = "data/screened_stocks_result.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required config key '{0}'")]
    MissingKey(&'static str),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid filter or setting: {0}")]
    Build(#[from] BuildError),
}

/// Where bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedConfig {
    Csv { dir: PathBuf },
    Synthetic {
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig::Synthetic { seed: DEFAULT_SEED }
    }
}

impl FeedConfig {
    pub fn build(&self) -> Arc<dyn DataFeed> {
        match self {
            FeedConfig::Csv { dir } => Arc::new(CsvFeed::new(dir.clone())),
            FeedConfig::Synthetic { seed } => Arc::new(SyntheticFeed::new(*seed)),
        }
    }
}

/// On-disk shape; required keys are optional here so their absence can be
/// reported by name.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    symbols_path: Option<PathBuf>,
    max_threads: Option<i64>,
    start: Option<String>,
    end: Option<String>,
    adjustment: Option<String>,
    output_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
    #[serde(default)]
    parallel: bool,
    #[serde(default)]
    feed: FeedConfig,
    filters: Option<Vec<PredicateSpec>>,
}

/// Validated screener configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub symbols_path: PathBuf,
    pub max_threads: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub adjustment: Adjustment,
    pub output_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub parallel: bool,
    pub feed: FeedConfig,
    pub filters: Vec<PredicateSpec>,
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ConfigError::Invalid(format!("{key} = '{value}': {e} (expected YYYY-MM-DD)")))
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

impl ScreenerConfig {
    /// Load from a TOML file. Relative paths are resolved against its directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_toml(&content, base)?;
        info!(
            path = %path.display(),
            symbols_path = %config.symbols_path.display(),
            max_threads = config.max_threads,
            filters = config.filters.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// Parse from a TOML string, resolving relative paths against `base`.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let symbols_path = raw
            .symbols_path
            .ok_or(ConfigError::MissingKey("symbols_path"))?;
        let max_threads = raw
            .max_threads
            .ok_or(ConfigError::MissingKey("max_threads"))?;
        if max_threads < 1 {
            return Err(ConfigError::Invalid(format!(
                "max_threads must be >= 1, got {max_threads}"
            )));
        }

        let start = raw.start.as_deref().map(|s| parse_date("start", s)).transpose()?;
        let end = raw.end.as_deref().map(|s| parse_date("end", s)).transpose()?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ConfigError::Invalid(format!("start {s} is after end {e}")));
            }
        }

        let adjustment = match raw.adjustment.as_deref() {
            Some(a) => a.parse()?,
            None => Adjustment::default(),
        };

        let feed = match raw.feed {
            FeedConfig::Csv { dir } => FeedConfig::Csv {
                dir: resolve(base, dir),
            },
            other => other,
        };

        let config = Self {
            symbols_path: resolve(base, symbols_path),
            max_threads: max_threads as usize,
            start,
            end,
            adjustment,
            output_path: resolve(
                base,
                raw.output_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            ),
            summary_path: raw.summary_path.map(|p| resolve(base, p)),
            parallel: raw.parallel,
            feed,
            filters: raw.filters.unwrap_or_else(default_filters),
        };
        // Reject bad filter definitions at load time.
        config.build_filters()?;
        Ok(config)
    }

    pub fn build_filters(&self) -> Result<Vec<Box<dyn Predicate>>, BuildError> {
        stockscreen_core::predicate::factory::build_all(&self.filters)
    }

    /// Resolve the run's date range, with explicit overrides taking precedence.
    pub fn time_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<TimeRange, RangeError> {
        TimeRange::resolve(start.or(self.start), end.or(self.end), today)
    }

    /// Feed, filters, range and adjustment assembled into a ready chain.
    pub fn build_chain(&self, range: TimeRange) -> Result<FilterChain, ConfigError> {
        let mut chain = FilterChain::new(self.feed.build(), range)
            .with_adjustment(self.adjustment)
            .with_parallel(self.parallel);
        for predicate in self.build_filters()? {
            chain.add_filter(predicate);
        }
        Ok(chain)
    }
}

/// Close above MA5, then WR14 on 30-minute bars below -80.
pub fn default_filters() -> Vec<PredicateSpec> {
    vec![
        PredicateSpec::Compare {
            left: RawOperand::Name("close".into()),
            right: RawOperand::Name("MA5".into()),
            relation: "gt".into(),
            sampling_period: "1d".into(),
        },
        PredicateSpec::WilliamsR {
            period: 14,
            threshold: -80.0,
            relation: "lt".into(),
            sampling_period: "30m".into(),
        },
    ]
}
