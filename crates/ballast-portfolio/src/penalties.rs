//! Penalty terms on the weight vector.
//!
//! Each term is a pure scalar function of the weights and a
//! [`PenaltyContext`] holding per-asset data aligned with the weight index.
//! Terms are independent and compose freely.
//!
//! | Term    | Value                                   |
//! |---------|-----------------------------------------|
//! | Risk    | `sqrt(wᵀ Σ w)`                          |
//! | TaxCost | `Σ w_i × value_i × rate_i / total`      |
//! | Esg     | `Σ m_i × w_i × (100 - esg_i)`           |
//!
//! With every asset scored (`m_i = 1`) and `Σ w = 1`, the ESG term equals
//! `100 - w · esg`.

use ballast_core::tax::{holding_period_days, tax_rate};
use ballast_core::types::ESG_MAX;
use ballast_core::{Asset, Date};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, PortfolioResult};
use crate::types::{EsgPolicy, PenaltyConfig};

/// Volatility below which the risk gradient is taken as zero.
const RISK_GRADIENT_FLOOR: f64 = 1e-15;

/// Portfolio standard deviation `sqrt(wᵀ Σ w)`, floored at zero.
#[must_use]
pub fn portfolio_risk(weights: &DVector<f64>, covariance: &DMatrix<f64>) -> f64 {
    weights.dot(&(covariance * weights)).max(0.0).sqrt()
}

/// A penalty term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyTerm {
    /// Portfolio standard deviation.
    Risk,
    /// Capital-gains tax exposure, relative to total portfolio value.
    TaxCost,
    /// Shortfall of the weighted ESG score from 100.
    Esg,
}

impl PenaltyTerm {
    /// Returns the term's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Risk => "risk",
            Self::TaxCost => "tax_cost",
            Self::Esg => "esg",
        }
    }

    /// Evaluates the term.
    #[must_use]
    pub fn value(&self, weights: &DVector<f64>, context: &PenaltyContext) -> f64 {
        match self {
            Self::Risk => portfolio_risk(weights, &context.covariance),
            Self::TaxCost => weights.dot(&context.tax_coefficients),
            Self::Esg => weights.dot(&context.esg_shortfall),
        }
    }

    /// Gradient of the term with respect to the weights.
    ///
    /// The risk gradient is `Σ w / σ`; it is taken as zero when `σ` vanishes.
    #[must_use]
    pub fn gradient(&self, weights: &DVector<f64>, context: &PenaltyContext) -> DVector<f64> {
        match self {
            Self::Risk => {
                let sigma_w = &context.covariance * weights;
                let risk = weights.dot(&sigma_w).max(0.0).sqrt();
                if risk < RISK_GRADIENT_FLOOR {
                    DVector::zeros(weights.len())
                } else {
                    sigma_w / risk
                }
            }
            Self::TaxCost => context.tax_coefficients.clone(),
            Self::Esg => context.esg_shortfall.clone(),
        }
    }
}

/// Static per-asset data the penalty terms read.
#[derive(Debug, Clone)]
pub struct PenaltyContext {
    covariance: DMatrix<f64>,
    tax_coefficients: DVector<f64>,
    esg_shortfall: DVector<f64>,
}

impl PenaltyContext {
    /// Builds the context for `assets`, aligned with `covariance`.
    ///
    /// Tax coefficients are `value_i × rate_i / total`, where the rate comes
    /// from the holding period at `as_of`. A portfolio with zero total value
    /// has zero tax exposure. ESG data is resolved through the policy only
    /// when the ESG term is enabled.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the asset count does not match the covariance.
    /// - `MissingEsgScore` under [`EsgPolicy::Reject`] for an unscored asset.
    pub fn build(
        assets: &[&Asset],
        covariance: DMatrix<f64>,
        config: &PenaltyConfig,
        as_of: Date,
    ) -> PortfolioResult<Self> {
        let n = assets.len();
        if covariance.nrows() != n || covariance.ncols() != n {
            return Err(PortfolioError::invalid_input(format!(
                "covariance is {}x{} but there are {n} assets",
                covariance.nrows(),
                covariance.ncols()
            )));
        }

        let total_value: f64 = assets.iter().map(|a| a.market_value()).sum();
        let tax_coefficients = DVector::from_iterator(
            n,
            assets.iter().map(|a| {
                if total_value > 0.0 {
                    let days = holding_period_days(a.purchase_date, as_of);
                    a.market_value() * tax_rate(days, &config.jurisdiction) / total_value
                } else {
                    0.0
                }
            }),
        );

        let esg_shortfall = if config.esg.enabled {
            let shortfall = assets
                .iter()
                .map(|a| resolve_esg(a, config.esg_policy).map(|s| s.map_or(0.0, |s| ESG_MAX - s)))
                .collect::<PortfolioResult<Vec<f64>>>()?;
            DVector::from_vec(shortfall)
        } else {
            DVector::zeros(n)
        };

        Ok(Self {
            covariance,
            tax_coefficients,
            esg_shortfall,
        })
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tax_coefficients.len()
    }

    /// Returns true if there are no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tax_coefficients.is_empty()
    }

    /// The covariance used by the risk term.
    #[must_use]
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Per-asset tax coefficients.
    #[must_use]
    pub fn tax_coefficients(&self) -> &DVector<f64> {
        &self.tax_coefficients
    }

    /// Per-asset ESG shortfall `m_i × (100 - esg_i)`.
    #[must_use]
    pub fn esg_shortfall(&self) -> &DVector<f64> {
        &self.esg_shortfall
    }
}

/// Score used for `asset` under `policy`; `None` means excluded from the term.
fn resolve_esg(asset: &Asset, policy: EsgPolicy) -> PortfolioResult<Option<f64>> {
    match (asset.esg_score, policy) {
        (Some(score), _) => Ok(Some(score)),
        (None, EsgPolicy::Exclude) => Ok(None),
        (None, EsgPolicy::Default(score)) => Ok(Some(score)),
        (None, EsgPolicy::Reject) => Err(PortfolioError::missing_esg(&asset.symbol)),
    }
}
