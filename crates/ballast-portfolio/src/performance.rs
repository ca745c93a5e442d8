//! Performance evaluation of a weight vector.

use ballast_core::Asset;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::{PortfolioError, PortfolioResult};
use crate::penalties::portfolio_risk;
use crate::types::WeightBasis;

/// Expected return and risk of one weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// `w · μ` per period.
    pub expected_return: f64,
    /// `sqrt(wᵀ Σ w)` per period.
    pub risk: f64,
    /// `expected_return / risk`, absent when risk is zero.
    pub return_to_risk: Option<f64>,
}

/// Evaluates `weights` against the return statistics.
///
/// # Errors
///
/// Returns `InvalidInput` if the dimensions disagree.
pub fn evaluate(
    weights: &DVector<f64>,
    expected_returns: &DVector<f64>,
    covariance: &DMatrix<f64>,
) -> PortfolioResult<PerformanceMetrics> {
    let n = weights.len();
    if expected_returns.len() != n || covariance.nrows() != n || covariance.ncols() != n {
        return Err(PortfolioError::invalid_input(format!(
            "weights ({n}), expected returns ({}) and covariance ({}x{}) disagree",
            expected_returns.len(),
            covariance.nrows(),
            covariance.ncols()
        )));
    }

    let expected_return = weights.dot(expected_returns);
    let risk = portfolio_risk(weights, covariance);
    let return_to_risk = (risk > 0.0).then(|| expected_return / risk);

    Ok(PerformanceMetrics {
        expected_return,
        risk,
        return_to_risk,
    })
}

/// Weights implied by the current holdings.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty slice, or when the chosen basis
/// totals zero (no shares held).
pub fn holding_weights(assets: &[&Asset], basis: WeightBasis) -> PortfolioResult<DVector<f64>> {
    if assets.is_empty() {
        return Err(PortfolioError::invalid_input("no holdings to weight"));
    }

    let raw: Vec<f64> = match basis {
        WeightBasis::Shares => assets.iter().map(|a| a.shares as f64).collect(),
        WeightBasis::MarketValue => assets.iter().map(|a| a.market_value()).collect(),
        WeightBasis::Equal => vec![1.0; assets.len()],
    };
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(PortfolioError::invalid_input(format!(
            "holdings total zero on a {} basis",
            basis.name().to_lowercase()
        )));
    }

    Ok(DVector::from_iterator(
        raw.len(),
        raw.into_iter().map(|v| v / total),
    ))
}

/// Whole-share counts that realize `weights` at the latest prices for the
/// same total market value: `floor(w_i × total / price_i)`.
#[must_use]
pub fn target_shares(assets: &[&Asset], weights: &[f64]) -> Vec<u64> {
    let total: f64 = assets.iter().map(|a| a.market_value()).sum();
    assets
        .iter()
        .zip(weights)
        .map(|(a, w)| (w * total / a.price).floor().max(0.0) as u64)
        .collect()
}
