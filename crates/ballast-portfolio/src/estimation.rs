//! Return and covariance estimation from price histories.
//!
//! Price series are turned into simple returns, then summarized as an
//! expected-return vector (arithmetic means) and a sample covariance
//! matrix. Index order follows the history's source order and is shared by
//! every derived structure.

use ballast_core::PriceSeries;
use ballast_math::statistics::{means, sample_covariance};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::{PortfolioError, PortfolioResult};
use crate::types::PriceHistory;

/// Fewest assets the optimizer can allocate across.
pub const MIN_ASSETS: usize = 2;

/// A symbol dropped during estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedSeries {
    /// The dropped symbol.
    pub symbol: String,
    /// Why its prices were unusable.
    pub reason: String,
}

/// Return statistics for the surviving assets.
#[derive(Debug, Clone)]
pub struct ReturnStatistics {
    /// Surviving symbols in source order.
    pub symbols: Vec<String>,
    /// Simple returns per surviving symbol.
    pub returns: Vec<Vec<f64>>,
    /// Mean return per surviving symbol.
    pub expected_returns: DVector<f64>,
    /// Sample covariance (denominator `n - 1`).
    pub covariance: DMatrix<f64>,
    /// Symbols dropped for unusable prices.
    pub excluded: Vec<ExcludedSeries>,
}

impl ReturnStatistics {
    /// Number of surviving assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no assets survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of return observations per asset.
    #[must_use]
    pub fn observations(&self) -> usize {
        self.returns.first().map_or(0, Vec::len)
    }
}

/// Estimates expected returns and covariance from price histories.
///
/// Symbols without prices, and series with fewer than two prices or a
/// non-positive or non-finite price, are excluded and reported in
/// [`ReturnStatistics::excluded`].
///
/// # Errors
///
/// - `InsufficientData` if fewer than [`MIN_ASSETS`] series are usable.
/// - `DataAlignment` if the usable series differ in length.
pub fn estimate(history: &PriceHistory) -> PortfolioResult<ReturnStatistics> {
    let mut symbols = Vec::new();
    let mut returns = Vec::new();
    let mut excluded = Vec::new();

    for (symbol, prices) in history.iter() {
        let series = match prices {
            None => Err("no price history".to_string()),
            Some(p) => PriceSeries::new(p.to_vec()).map_err(|e| e.to_string()),
        };
        match series {
            Ok(series) => {
                symbols.push(symbol.to_string());
                returns.push(series.returns());
            }
            Err(reason) => {
                tracing::warn!(symbol, %reason, "excluding asset from estimation");
                excluded.push(ExcludedSeries {
                    symbol: symbol.to_string(),
                    reason,
                });
            }
        }
    }

    if symbols.len() < MIN_ASSETS {
        return Err(PortfolioError::insufficient_data(symbols.len()));
    }

    let expected = returns[0].len();
    if let Some((i, r)) = returns
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != expected)
    {
        return Err(PortfolioError::DataAlignment {
            symbol: symbols[i].clone(),
            expected,
            actual: r.len(),
        });
    }

    let expected_returns = means(&returns)?;
    let covariance = sample_covariance(&returns)?;

    tracing::debug!(
        assets = symbols.len(),
        observations = expected,
        excluded = excluded.len(),
        "estimated return statistics"
    );

    Ok(ReturnStatistics {
        symbols,
        returns,
        expected_returns,
        covariance,
        excluded,
    })
}
