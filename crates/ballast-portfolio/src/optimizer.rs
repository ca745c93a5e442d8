//! Budget- and box-constrained weight optimization.

use std::fmt;

use ballast_math::optimization::{
    BudgetBox, ConstrainedSolver, Objective, OptimizationConfig, SpectralProjectedGradient,
    Termination,
};
use serde::Serialize;

use crate::error::{PortfolioError, PortfolioResult};
use crate::types::OptimizerConfig;

/// Outcome of one optimization.
///
/// A failed run carries no weights; the message says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    /// Optimized weights, present only on success.
    pub weights: Option<Vec<f64>>,
    /// Objective value at the solver's final point.
    pub objective_value: f64,
    /// Whether the solver converged to a feasible point.
    pub success: bool,
    /// Human-readable diagnostic.
    pub message: String,
    /// Solver iterations used.
    pub iterations: u32,
}

impl Allocation {
    /// Returns the weights, or `SolverNonConvergence` for a failed run.
    pub fn into_weights(self) -> PortfolioResult<Vec<f64>> {
        match self.weights {
            Some(weights) if self.success => Ok(weights),
            _ => Err(PortfolioError::non_convergence(self.iterations, self.message)),
        }
    }
}

/// Minimizes an objective over `{Σ w = 1, lower <= w_i <= upper}`.
///
/// Feasibility of the bounds is checked before the solver runs. The solver
/// starts from uniform weights `1/n`.
pub struct ConstrainedOptimizer {
    solver: Box<dyn ConstrainedSolver>,
    config: OptimizerConfig,
}

impl fmt::Debug for ConstrainedOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstrainedOptimizer")
            .field("solver", &self.solver.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ConstrainedOptimizer {
    /// Creates an optimizer using spectral projected gradient.
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_solver(Box::new(SpectralProjectedGradient::new()), config)
    }

    /// Creates an optimizer with a custom solver.
    #[must_use]
    pub fn with_solver(solver: Box<dyn ConstrainedSolver>, config: OptimizerConfig) -> Self {
        Self { solver, config }
    }

    /// The optimizer configuration.
    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Uniform starting weights for `num_assets`.
    #[must_use]
    pub fn initial_weights(num_assets: usize) -> Vec<f64> {
        vec![1.0 / num_assets as f64; num_assets]
    }

    /// Minimizes `objective` over `num_assets` weights.
    ///
    /// # Errors
    ///
    /// - `InfeasibleConstraints` if the bounds cannot meet the budget; the
    ///   solver is not run.
    /// - `InvalidInput` for zero assets or an invalid solver configuration.
    ///
    /// Non-convergence is not an error here: it is reported as
    /// `success = false` on the returned [`Allocation`].
    pub fn optimize(
        &self,
        objective: &dyn Objective,
        num_assets: usize,
    ) -> PortfolioResult<Allocation> {
        if num_assets == 0 {
            return Err(PortfolioError::invalid_input("no assets to optimize"));
        }
        self.config.check_feasible(num_assets)?;

        let constraints =
            BudgetBox::uniform(num_assets, self.config.lower_bound, self.config.upper_bound);
        let initial = Self::initial_weights(num_assets);
        let solver_config =
            OptimizationConfig::new(self.config.tolerance, self.config.max_iterations);

        let result = self
            .solver
            .minimize(objective, &constraints, &initial, &solver_config)?;

        let mut allocation = Allocation {
            weights: None,
            objective_value: result.objective_value,
            success: false,
            message: String::new(),
            iterations: result.iterations,
        };

        if !result.converged {
            allocation.message = format!(
                "{} stopped after {} iteration(s): {}",
                self.solver.name(),
                result.iterations,
                result.termination.describe()
            );
            tracing::warn!(
                iterations = result.iterations,
                stationarity = result.stationarity,
                termination = ?result.termination,
                "optimization did not converge"
            );
            return Ok(allocation);
        }

        if let Some(violation) = self.constraint_violation(&result.parameters) {
            allocation.message = format!("solver returned an infeasible point: {violation}");
            tracing::warn!(%violation, "optimization result violates constraints");
            return Ok(allocation);
        }

        allocation.message = match result.termination {
            Termination::NumericalStationarity => {
                "Optimization converged (objective flat to machine precision)".to_string()
            }
            _ => "Optimization converged".to_string(),
        };
        allocation.success = true;
        allocation.weights = Some(result.parameters);
        tracing::debug!(
            iterations = allocation.iterations,
            objective = allocation.objective_value,
            "optimization converged"
        );
        Ok(allocation)
    }

    fn constraint_violation(&self, weights: &[f64]) -> Option<String> {
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > self.config.budget_tolerance {
            return Some(format!("weights sum to {sum}"));
        }
        weights
            .iter()
            .position(|w| *w < self.config.lower_bound || *w > self.config.upper_bound)
            .map(|i| format!("weight {i} = {} is outside the bounds", weights[i]))
    }
}

impl Default for ConstrainedOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}
