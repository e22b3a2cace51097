//! StockScreen Core: bar series, indicators, predicates, filter chain, data feeds.
//!
//! This crate contains the screening engine:
//! - Domain types (bars, bar series, sampling periods, date ranges, symbols)
//! - Indicator library (moving average, Williams %R)
//! - Predicates evaluated on the last row of a symbol's history
//! - The filter chain that applies predicates cumulatively
//! - Data feeds (CSV directory, synthetic, in-memory) and bulk download

pub mod chain;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod predicate;

pub use chain::{FilterChain, ScreenError, StageReport};
pub use error::BuildError;
