//! CSV directory feed.
//!
//! One file per symbol and sampling period, named `{SYMBOL}_{period}.csv`
//! (e.g. `600519.SH_1d.csv`), with header
//! `date,open,high,low,close,volume,amount`. Files are taken as already
//! adjusted; the requested adjustment is not applied here.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use super::feed::{DataError, DataFeed};
use crate::domain::{Adjustment, Bar, BarSeries, SamplingPeriod};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    amount: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CsvFeed {
    dir: PathBuf,
}

impl CsvFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `symbol` at `period`.
    pub fn file_path(&self, symbol: &str, period: SamplingPeriod) -> PathBuf {
        self.dir.join(format!("{symbol}_{period}.csv"))
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` and `YYYYMMDD`.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl DataFeed for CsvFeed {
    fn name(&self) -> &str {
        "csv"
    }

    fn check_ready(&self) -> Result<(), DataError> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(DataError::ProviderUnavailable(format!(
                "bar directory {} does not exist",
                self.dir.display()
            )))
        }
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        period: SamplingPeriod,
        _adjustment: Adjustment,
    ) -> Result<Option<BarSeries>, DataError> {
        let path = self.file_path(symbol, period);
        if !path.exists() {
            debug!(%symbol, path = %path.display(), "no csv file");
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(source) => DataError::Io {
                path: path.clone(),
                source,
            },
            other => DataError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("{other:?}"),
            },
        })?;

        let mut bars = Vec::new();
        for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = record.map_err(|e| DataError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("row {}: {e}", line + 1),
            })?;
            let timestamp = parse_timestamp(&row.date).ok_or_else(|| DataError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("row {}: bad date '{}'", line + 1, row.date),
            })?;
            let day = timestamp.date();
            if day < start || day > end {
                continue;
            }
            let volume = if row.volume.is_finite() && row.volume > 0.0 {
                row.volume.round() as u64
            } else {
                0
            };
            bars.push(Bar {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume,
                amount: row.amount.unwrap_or(row.close * volume as f64),
            });
        }

        if bars.is_empty() {
            return Ok(None);
        }
        Ok(Some(BarSeries::new(symbol, period, bars)))
    }
}
