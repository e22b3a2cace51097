//! Symbol list input.
//!
//! A CSV file with a `stock_code` header column; other columns are ignored.
//! Codes are read as text so leading zeros survive (`000001` stays `000001`).

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub const SYMBOL_COLUMN: &str = "stock_code";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("symbol list {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read symbol list {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("symbol list {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Read the symbol column, trimming whitespace and skipping blank cells.
/// Order and duplicates are preserved.
pub fn load_symbols(path: &Path) -> Result<Vec<String>, UniverseError> {
    if !path.exists() {
        return Err(UniverseError::NotFound(path.to_path_buf()));
    }
    let csv_err = |source| UniverseError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == SYMBOL_COLUMN)
        .ok_or_else(|| UniverseError::MissingColumn {
            path: path.to_path_buf(),
            column: SYMBOL_COLUMN,
        })?;

    let mut symbols = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        match record.get(column) {
            Some(code) if !code.is_empty() => symbols.push(code.to_string()),
            _ => warn!(row = row + 1, "blank stock_code, skipped"),
        }
    }
    info!(path = %path.display(), count = symbols.len(), "symbol list loaded");
    Ok(symbols)
}
