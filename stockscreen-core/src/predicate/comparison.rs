//! Binary relations between two last-row values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Gt => "gt",
            Comparison::Lt => "lt",
            Comparison::Eq => "eq",
            Comparison::Gte => "gte",
            Comparison::Lte => "lte",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Eq => "==",
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
        }
    }

    /// Whether `left <relation> right` holds. Equality is exact.
    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Gt => left > right,
            Comparison::Lt => left < right,
            Comparison::Eq => left == right,
            Comparison::Gte => left >= right,
            Comparison::Lte => left <= right,
        }
    }

    /// Strict relations accepted by the MA and WR predicates.
    pub fn is_strict(&self) -> bool {
        matches!(self, Comparison::Gt | Comparison::Lt)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparison {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt" => Ok(Comparison::Gt),
            "lt" => Ok(Comparison::Lt),
            "eq" => Ok(Comparison::Eq),
            "gte" => Ok(Comparison::Gte),
            "lte" => Ok(Comparison::Lte),
            other => Err(BuildError::UnknownComparison(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_matches_operator() {
        assert!(Comparison::Gt.holds(2.0, 1.0));
        assert!(!Comparison::Gt.holds(1.0, 1.0));
        assert!(Comparison::Gte.holds(1.0, 1.0));
        assert!(Comparison::Lte.holds(1.0, 1.0));
        assert!(Comparison::Eq.holds(1.5, 1.5));
        assert!(!Comparison::Lt.holds(f64::NAN, 1.0));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!("gte".parse::<Comparison>(), Ok(Comparison::Gte));
        assert_eq!(
            "ne".parse::<Comparison>(),
            Err(BuildError::UnknownComparison("ne".into()))
        );
    }
}
