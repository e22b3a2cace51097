//! Screen orchestration on top of `stockscreen-core`.
//!
//! - TOML configuration with required-key checks and a default filter chain
//! - Symbol list loading (`stock_code` column)
//! - End-to-end screen and bulk download runs
//! - Result export: symbol CSV, JSON run summary, text report

pub mod config;
pub mod export;
pub mod runner;
pub mod universe;

pub use config::{default_filters, ConfigError, FeedConfig, ScreenerConfig, DEFAULT_OUTPUT_PATH};
pub use export::{
    export_summary_json, export_symbols_csv, generate_report, import_summary_json,
    write_summary_json, write_symbols_csv, ScreenSummary,
};
pub use runner::{
    run_download, run_screen, DownloadOptions, RunError, ScreenOutcome, ScreenOverrides,
};
pub use universe::{load_symbols, UniverseError, SYMBOL_COLUMN};
