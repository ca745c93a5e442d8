//! Holding weighting bases.

use serde::{Deserialize, Serialize};

/// How the as-held weight vector is derived from holdings.
///
/// The optimizer never uses this; it only decides how the current
/// portfolio is expressed as weights for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBasis {
    /// Share count over total shares.
    #[default]
    Shares,

    /// Market value (shares × latest price) over total market value.
    MarketValue,

    /// Equal weight across all holdings.
    Equal,
}

impl WeightBasis {
    /// Returns a human-readable name for the weighting basis.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shares => "Shares",
            Self::MarketValue => "Market Value",
            Self::Equal => "Equal Weight",
        }
    }

    /// Returns a short code for the weighting basis.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Shares => "SH",
            Self::MarketValue => "MV",
            Self::Equal => "EQ",
        }
    }
}

impl std::fmt::Display for WeightBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
