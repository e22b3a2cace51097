//! Result export: screened-symbol CSV, JSON run summary, plain-text report.
//!
//! The JSON summary carries a `schema_version`; unknown versions are rejected
//! on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use stockscreen_core::domain::TimeRange;
use stockscreen_core::StageReport;

pub const RESULT_COLUMN: &str = "screened_symbol";

/// Current schema version for persisted summaries.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything needed to understand one screening run after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub range: TimeRange,
    pub adjustment: String,
    pub feed: String,
    pub filters: Vec<String>,
    pub stages: Vec<StageReport>,
    pub input_count: usize,
    pub passed: Vec<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

// ─── CSV ────────────────────────────────────────────────────────────

/// One `screened_symbol` column, one row per symbol, in order.
pub fn export_symbols_csv(symbols: &[String]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([RESULT_COLUMN])?;
    for symbol in symbols {
        wtr.write_record([symbol])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the symbol CSV, creating parent directories as needed.
pub fn write_symbols_csv(symbols: &[String], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let body = export_symbols_csv(symbols)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_summary_json(summary: &ScreenSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize ScreenSummary to JSON")
}

pub fn import_summary_json(json: &str) -> Result<ScreenSummary> {
    let summary: ScreenSummary =
        serde_json::from_str(json).context("failed to deserialize ScreenSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

pub fn write_summary_json(summary: &ScreenSummary, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = export_summary_json(summary)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display())),
        _ => Ok(()),
    }
}

// ─── Text report ────────────────────────────────────────────────────

/// Human-readable stage table and result list.
pub fn generate_report(summary: &ScreenSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Screen {} ({} adjustment, {} feed)\n",
        summary.range, summary.adjustment, summary.feed
    ));
    out.push_str(&format!("Candidates: {}\n", summary.input_count));

    if summary.filters.is_empty() {
        out.push_str("No filters configured; all candidates pass.\n");
    } else {
        let width = summary
            .filters
            .iter()
            .map(|f| f.len())
            .max()
            .unwrap_or(0)
            .max("Filter".len());
        out.push_str(&format!("\n{:<width$}  {:>6}  {:>6}\n", "Filter", "In", "Out"));
        for name in &summary.filters {
            match summary.stages.iter().find(|s| &s.name == name) {
                Some(stage) => out.push_str(&format!(
                    "{:<width$}  {:>6}  {:>6}\n",
                    stage.name, stage.input, stage.passed
                )),
                None => out.push_str(&format!("{:<width$}  {:>6}  {:>6}\n", name, "-", "skipped")),
            }
        }
    }

    out.push_str(&format!("\nPassed: {}\n", summary.passed.len()));
    for symbol in &summary.passed {
        out.push_str(&format!("  {symbol}\n"));
    }
    out
}
