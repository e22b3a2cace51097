//! stockscreen CLI: screen, download and symbol normalization commands.
//!
//! Commands:
//! - `screen`: run the configured filter chain over the symbol list and write results
//! - `download`: bulk-fetch bars for every listed symbol on the worker pool
//! - `normalize`: print the canonical `NNNNNN.SH` / `NNNNNN.SZ` form of codes

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use stockscreen_core::data::LogProgress;
use stockscreen_core::domain::{normalize_symbol, Adjustment, SamplingPeriod};
use stockscreen_runner::{
    generate_report, run_download, run_screen, DownloadOptions, ScreenOverrides, ScreenerConfig,
};

#[derive(Parser)]
#[command(name = "stockscreen", about = "A-share stock screener: chained technical filters")]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the configured symbol list through the filter chain.
    Screen {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Start date (YYYY-MM-DD). Overrides the config.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Overrides the config.
        #[arg(long)]
        end: Option<String>,

        /// Result CSV path. Overrides `output_path`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// JSON run summary path. Overrides `summary_path`.
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Evaluate symbols in parallel within each filter.
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Fetch bars for every listed symbol using `max_threads` workers.
    Download {
        /// Path to the TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Sampling period: 1m, 5m, 30m or 1d.
        #[arg(long, default_value = "1d")]
        period: String,

        /// Price adjustment: pre, post or none. Defaults to the config value.
        #[arg(long)]
        adjustment: Option<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,
    },
    /// Print the canonical form of each code.
    Normalize {
        /// Codes such as 600519, SZ.000001 or 000001.SZ.
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn parse_date(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("--{flag} '{s}' is not a YYYY-MM-DD date"))
        })
        .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = dispatch(cli.command);
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Screen {
            config,
            start,
            end,
            output,
            summary,
            parallel,
        } => {
            let overrides = ScreenOverrides {
                start: parse_date("start", start.as_deref())?,
                end: parse_date("end", end.as_deref())?,
                output_path: output,
                summary_path: summary,
                parallel: parallel.then_some(true),
            };
            run_screen_cmd(&config, &overrides)
        }
        Commands::Download {
            config,
            period,
            adjustment,
            start,
            end,
        } => {
            let opts = DownloadOptions {
                period: period.parse::<SamplingPeriod>()?,
                adjustment: adjustment
                    .as_deref()
                    .map(str::parse::<Adjustment>)
                    .transpose()?,
                start: parse_date("start", start.as_deref())?,
                end: parse_date("end", end.as_deref())?,
            };
            run_download_cmd(&config, &opts)
        }
        Commands::Normalize { codes } => {
            run_normalize(&codes);
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn run_screen_cmd(config_path: &Path, overrides: &ScreenOverrides) -> Result<()> {
    let config = ScreenerConfig::from_file(config_path)?;
    let outcome = run_screen(&config, overrides, today())?;
    info!(
        candidates = outcome.summary.input_count,
        passed = outcome.summary.passed.len(),
        "screen complete"
    );

    print!("{}", generate_report(&outcome.summary));
    println!("\nResults saved to: {}", outcome.output_path.display());
    if let Some(path) = &outcome.summary_path {
        println!("Summary saved to: {}", path.display());
    }
    Ok(())
}

fn run_download_cmd(config_path: &Path, opts: &DownloadOptions) -> Result<()> {
    let config = ScreenerConfig::from_file(config_path)?;
    let summary = run_download(&config, opts, today(), &LogProgress)?;

    println!(
        "Downloaded {}/{} symbols ({} failed)",
        summary.succeeded, summary.total, summary.failed
    );
    let mut missing: Vec<&String> = summary
        .data
        .iter()
        .filter(|(_, series)| series.is_none())
        .map(|(symbol, _)| symbol)
        .collect();
    missing.sort();
    for symbol in missing {
        println!("  no data: {symbol}");
    }
    Ok(())
}

fn run_normalize(codes: &[String]) {
    for code in codes {
        match normalize_symbol(code) {
            Some(canonical) => println!("{code}\t{canonical}"),
            None => println!("{code}\tinvalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_flags_parse() {
        let cli = Cli::try_parse_from([
            "stockscreen",
            "screen",
            "--config",
            "screen.toml",
            "--end",
            "2025-06-30",
            "--parallel",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Screen {
                config,
                end,
                parallel,
                start,
                ..
            } => {
                assert_eq!(config, PathBuf::from("screen.toml"));
                assert_eq!(end.as_deref(), Some("2025-06-30"));
                assert!(start.is_none());
                assert!(parallel);
            }
            _ => panic!("expected screen"),
        }
    }

    #[test]
    fn bad_dates_name_the_flag() {
        assert_eq!(
            parse_date("start", Some("2025-01-02")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2)
        );
        assert_eq!(parse_date("end", None).unwrap(), None);
        let err = parse_date("end", Some("06/30/2025")).unwrap_err();
        assert!(err.to_string().contains("--end"));
    }

    #[test]
    fn failed_commands_are_reported_as_errors() {
        let err = dispatch(Commands::Screen {
            config: PathBuf::from("does/not/exist.toml"),
            start: None,
            end: None,
            output: None,
            summary: None,
            parallel: false,
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("does not exist"));
    }
}
