//! Construction-time errors.
//!
//! Anything raised here is fatal to whoever is building a chain: a predicate
//! with an unparseable operand never gets to run.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("unknown operand '{0}' (expected a number, a field name or an MA/WR indicator)")]
    UnknownOperand(String),

    #[error("unsupported indicator '{0}' (expected MA<period> or WR<period>)")]
    UnsupportedIndicator(String),

    #[error("invalid period {period} for {what}: must be >= 1")]
    InvalidPeriod { what: &'static str, period: usize },

    #[error("{predicate} only supports gt/lt, got '{relation}'")]
    UnsupportedRelation {
        predicate: &'static str,
        relation: String,
    },

    #[error("unknown comparison '{0}' (expected gt, lt, eq, gte or lte)")]
    UnknownComparison(String),

    #[error("unknown sampling period '{0}' (expected 1m, 5m, 30m or 1d)")]
    UnknownSamplingPeriod(String),

    #[error("unknown adjustment '{0}' (expected pre, post or none)")]
    UnknownAdjustment(String),
}
