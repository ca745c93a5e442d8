//! Historical price series.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Chronological closing prices for one asset.
///
/// Always holds at least two positive, finite prices, so it always yields
/// at least one return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    /// Minimum number of prices in a usable series.
    pub const MIN_LEN: usize = 2;

    /// Creates a validated price series.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPriceSeries` if fewer than two prices are
    /// given or any price is non-positive or non-finite.
    pub fn new(prices: Vec<f64>) -> CoreResult<Self> {
        if prices.len() < Self::MIN_LEN {
            return Err(CoreError::invalid_series(format!(
                "need at least {} prices, got {}",
                Self::MIN_LEN,
                prices.len()
            )));
        }
        if let Some((i, p)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(CoreError::invalid_series(format!(
                "price at index {i} must be positive and finite, got {p}"
            )));
        }
        Ok(Self(prices))
    }

    /// Number of prices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the prices as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the most recent price.
    #[must_use]
    pub fn latest(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Simple returns `(p[i] - p[i-1]) / p[i-1]`, one fewer than the prices.
    #[must_use]
    pub fn returns(&self) -> Vec<f64> {
        self.0.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = CoreError;

    fn try_from(prices: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(prices)
    }
}

impl From<PriceSeries> for Vec<f64> {
    fn from(series: PriceSeries) -> Self {
        series.0
    }
}
