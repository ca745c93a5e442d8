//! Constrained optimization.
//!
//! Minimizes a smooth objective over the feasible set
//!
//! ```text
//! { x : Σ x_i = budget,  lower_i <= x_i <= upper_i }
//! ```
//!
//! The pieces meet at two traits so callers stay solver-agnostic:
//!
//! - [`Objective`]: value and gradient of the function to minimize
//! - [`ConstrainedSolver`]: anything that minimizes an `Objective` over a [`BudgetBox`]
//!
//! [`SpectralProjectedGradient`] is the provided solver.

mod feasible_set;
mod spg;

pub use feasible_set::BudgetBox;
pub use spg::SpectralProjectedGradient;

use crate::error::MathResult;

/// Default step for central-difference gradients.
pub const DEFAULT_GRADIENT_STEP: f64 = 1e-7;

/// Configuration for optimization algorithms.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationConfig {
    /// Convergence tolerance on the projected-gradient step (infinity norm).
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
    /// Armijo sufficient-decrease constant.
    pub sufficient_decrease: f64,
    /// Smallest spectral step length.
    pub min_step: f64,
    /// Largest spectral step length.
    pub max_step: f64,
    /// Maximum step halvings per line search.
    pub max_backtracks: u32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 1000,
            sufficient_decrease: 1e-4,
            min_step: 1e-12,
            max_step: 1e12,
            max_backtracks: 60,
        }
    }
}

impl OptimizationConfig {
    /// Creates a configuration with the given tolerance and iteration cap.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final point. Always inside the feasible set.
    pub parameters: Vec<f64>,
    /// Objective value at `parameters`.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Whether the optimization converged.
    pub converged: bool,
    /// Why the solver stopped.
    pub termination: Termination,
    /// Infinity norm of the final projected-gradient step.
    pub stationarity: f64,
}

/// Why an optimization run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Projected-gradient step below tolerance.
    Converged,
    /// Remaining decrease is below floating-point resolution of the objective.
    NumericalStationarity,
    /// Iteration cap reached first.
    MaxIterations,
    /// No step along the search direction decreased the objective.
    LineSearchFailed,
    /// Objective or gradient became NaN or infinite.
    NonFinite,
}

impl Termination {
    /// Human-readable description.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Converged => "converged: projected gradient below tolerance",
            Self::NumericalStationarity => {
                "converged: remaining decrease below floating-point resolution"
            }
            Self::MaxIterations => "iteration limit reached before convergence",
            Self::LineSearchFailed => "line search failed to decrease the objective",
            Self::NonFinite => "objective or gradient is not finite",
        }
    }

    /// Returns true for the terminations that count as convergence.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged | Self::NumericalStationarity)
    }
}

/// A smooth function to minimize.
pub trait Objective {
    /// Objective value at `x`.
    fn value(&self, x: &[f64]) -> f64;

    /// Gradient at `x`.
    ///
    /// Defaults to central differences with [`DEFAULT_GRADIENT_STEP`].
    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        central_difference(|p| self.value(p), x, DEFAULT_GRADIENT_STEP)
    }
}

/// Wraps a closure as an [`Objective`] with a numerical gradient.
#[derive(Debug, Clone, Copy)]
pub struct NumericalObjective<F> {
    f: F,
}

impl<F> NumericalObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    /// Creates an objective using the default difference step.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Objective for NumericalObjective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn value(&self, x: &[f64]) -> f64 {
        (self.f)(x)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        central_difference(&self.f, x, DEFAULT_GRADIENT_STEP)
    }
}

/// Central-difference gradient of `f` at `x`.
pub fn central_difference<F>(f: F, x: &[f64], step: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut probe = x.to_vec();
    let mut gradient = vec![0.0; x.len()];
    for i in 0..x.len() {
        let original = probe[i];
        probe[i] = original + step;
        let f_plus = f(&probe);
        probe[i] = original - step;
        let f_minus = f(&probe);
        probe[i] = original;
        gradient[i] = (f_plus - f_minus) / (2.0 * step);
    }
    gradient
}

/// A minimizer over a budget-and-box feasible set.
pub trait ConstrainedSolver: Send + Sync {
    /// Minimizes `objective` over `constraints`, starting from `initial`.
    ///
    /// Non-convergence is reported through `OptimizationResult::converged`,
    /// not as an error. Errors are reserved for invalid inputs such as an
    /// empty feasible set or a dimension mismatch.
    fn minimize(
        &self,
        objective: &dyn Objective,
        constraints: &BudgetBox,
        initial: &[f64],
        config: &OptimizationConfig,
    ) -> MathResult<OptimizationResult>;

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}
