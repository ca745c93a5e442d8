//! Allocation requests and the prepared optimization problem.
//!
//! Preparing a problem runs everything that does not depend on the risk
//! tolerance once: input validation, estimation, covariance
//! regularization, and the penalty context. The prepared problem can then
//! be solved for one or many risk tolerances.

use std::collections::HashSet;

use ballast_core::{Asset, Date};
use ballast_math::linear_algebra::regularize_covariance;
use nalgebra::DVector;
use serde::Serialize;

use crate::error::{PortfolioError, PortfolioResult};
use crate::estimation::{estimate, ReturnStatistics};
use crate::objective::ObjectiveComposer;
use crate::optimizer::{Allocation, ConstrainedOptimizer};
use crate::penalties::PenaltyContext;
use crate::performance::{evaluate, holding_weights, PerformanceMetrics};
use crate::types::{OptimizerConfig, PenaltyConfig, PriceHistory, WeightBasis};

/// Everything needed to optimize one portfolio snapshot.
#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    /// Current holdings, in source order.
    pub assets: Vec<Asset>,
    /// Weight on risk in the objective. Must be non-negative.
    pub risk_tolerance: f64,
    /// Bounds and solver settings.
    pub optimizer: OptimizerConfig,
    /// Tax and ESG settings.
    pub penalties: PenaltyConfig,
    /// Reference date for holding periods.
    pub as_of: Date,
    /// How the current holdings are expressed as weights.
    pub holding_basis: WeightBasis,
}

impl OptimizationRequest {
    /// Creates a request with default optimizer and penalty settings.
    #[must_use]
    pub fn new(assets: Vec<Asset>, risk_tolerance: f64, as_of: Date) -> Self {
        Self {
            assets,
            risk_tolerance,
            optimizer: OptimizerConfig::default(),
            penalties: PenaltyConfig::default(),
            as_of,
            holding_basis: WeightBasis::default(),
        }
    }

    /// Sets the optimizer settings.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the penalty settings.
    #[must_use]
    pub fn with_penalties(mut self, penalties: PenaltyConfig) -> Self {
        self.penalties = penalties;
        self
    }

    /// Sets the holding weight basis.
    #[must_use]
    pub fn with_holding_basis(mut self, basis: WeightBasis) -> Self {
        self.holding_basis = basis;
        self
    }
}

/// Identity shift applied to an ill-conditioned covariance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CovarianceAdjustment {
    /// Multiple of the identity added.
    pub ridge: f64,
    /// Smallest eigenvalue before the shift.
    pub min_eigenvalue: f64,
    /// Largest eigenvalue before the shift.
    pub max_eigenvalue: f64,
}

/// Validates a risk tolerance.
pub fn check_risk_tolerance(risk_tolerance: f64) -> PortfolioResult<()> {
    if risk_tolerance.is_finite() && risk_tolerance >= 0.0 {
        Ok(())
    } else {
        Err(PortfolioError::invalid_input(format!(
            "risk tolerance must be a non-negative number, got {risk_tolerance}"
        )))
    }
}

/// A validated, estimated problem ready to solve.
#[derive(Debug, Clone)]
pub struct PreparedProblem {
    assets: Vec<Asset>,
    statistics: ReturnStatistics,
    adjustment: Option<CovarianceAdjustment>,
    context: PenaltyContext,
    penalties: PenaltyConfig,
    warnings: Vec<String>,
}

impl PreparedProblem {
    /// Validates the request and estimates the statistics.
    ///
    /// Histories are matched to assets by symbol; the asset order is the
    /// index order. History entries for symbols not held are ignored.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for duplicate symbols or invalid assets.
    /// - `InsufficientData` or `DataAlignment` from estimation.
    /// - `MissingEsgScore` under the reject policy.
    pub fn prepare(request: &OptimizationRequest, history: &PriceHistory) -> PortfolioResult<Self> {
        let mut seen = HashSet::new();
        for asset in &request.assets {
            asset.validate()?;
            if !seen.insert(asset.symbol.as_str()) {
                return Err(PortfolioError::invalid_input(format!(
                    "duplicate symbol '{}'",
                    asset.symbol
                )));
            }
        }
        request.penalties.validate()?;

        let symbols: Vec<&str> = request.assets.iter().map(|a| a.symbol.as_str()).collect();
        let statistics = estimate(&history.aligned_to(&symbols))?;

        let assets: Vec<Asset> = statistics
            .symbols
            .iter()
            .filter_map(|s| request.assets.iter().find(|a| a.symbol == *s))
            .cloned()
            .collect();

        let mut warnings: Vec<String> = statistics
            .excluded
            .iter()
            .map(|e| format!("excluded {}: {}", e.symbol, e.reason))
            .collect();

        let regularization =
            regularize_covariance(&statistics.covariance, request.optimizer.condition_floor)?;
        let adjustment = regularization.was_adjusted().then(|| {
            tracing::warn!(
                ridge = regularization.ridge,
                min_eigenvalue = regularization.min_eigenvalue,
                max_eigenvalue = regularization.max_eigenvalue,
                "covariance is ill-conditioned; added ridge to the diagonal"
            );
            warnings.push(format!(
                "covariance regularized: added {:e} to the diagonal (min eigenvalue {:e})",
                regularization.ridge, regularization.min_eigenvalue
            ));
            CovarianceAdjustment {
                ridge: regularization.ridge,
                min_eigenvalue: regularization.min_eigenvalue,
                max_eigenvalue: regularization.max_eigenvalue,
            }
        });

        let refs: Vec<&Asset> = assets.iter().collect();
        let context = PenaltyContext::build(
            &refs,
            regularization.matrix,
            &request.penalties,
            request.as_of,
        )?;

        Ok(Self {
            assets,
            statistics,
            adjustment,
            context,
            penalties: request.penalties.clone(),
            warnings,
        })
    }

    /// Surviving symbols in index order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.statistics.symbols
    }

    /// Surviving assets in index order.
    #[must_use]
    pub fn assets(&self) -> Vec<&Asset> {
        self.assets.iter().collect()
    }

    /// Number of surviving assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns true if no assets survived (never the case after `prepare`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Estimated statistics.
    #[must_use]
    pub fn statistics(&self) -> &ReturnStatistics {
        &self.statistics
    }

    /// Covariance adjustment, if one was needed.
    #[must_use]
    pub fn adjustment(&self) -> Option<&CovarianceAdjustment> {
        self.adjustment.as_ref()
    }

    /// Diagnostics gathered while preparing.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Builds the objective for `risk_tolerance`.
    pub fn composer(&self, risk_tolerance: f64) -> PortfolioResult<ObjectiveComposer> {
        ObjectiveComposer::new(
            self.statistics.expected_returns.clone(),
            risk_tolerance,
            self.context.clone(),
            &self.penalties,
        )
    }

    /// Optimizes for `risk_tolerance`.
    ///
    /// Returns the objective alongside the allocation so callers can
    /// break the result down by term.
    pub fn solve(
        &self,
        risk_tolerance: f64,
        optimizer: &ConstrainedOptimizer,
    ) -> PortfolioResult<(ObjectiveComposer, Allocation)> {
        let composer = self.composer(risk_tolerance)?;
        let allocation = optimizer.optimize(&composer, self.len())?;
        Ok((composer, allocation))
    }

    /// Evaluates `weights` against the sample statistics.
    pub fn evaluate(&self, weights: &DVector<f64>) -> PortfolioResult<PerformanceMetrics> {
        evaluate(
            weights,
            &self.statistics.expected_returns,
            &self.statistics.covariance,
        )
    }

    /// Performance of the portfolio as currently held.
    pub fn current_performance(&self, basis: WeightBasis) -> PortfolioResult<PerformanceMetrics> {
        let weights = holding_weights(&self.assets(), basis)?;
        self.evaluate(&weights)
    }
}
