//! Configuration for the optimizer and the penalty terms.

use ballast_core::Jurisdiction;
use ballast_math::linear_algebra::DEFAULT_CONDITION_FLOOR;
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, PortfolioResult};

/// Default lower bound on each weight.
pub const DEFAULT_LOWER_BOUND: f64 = 0.05;

/// Default upper bound on each weight.
pub const DEFAULT_UPPER_BOUND: f64 = 0.30;

/// Solver and constraint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Minimum weight per asset.
    pub lower_bound: f64,

    /// Maximum weight per asset.
    pub upper_bound: f64,

    /// Convergence tolerance on the projected-gradient step.
    pub tolerance: f64,

    /// Iteration cap. Always respected.
    pub max_iterations: u32,

    /// Allowed deviation of the weight sum from one in a successful result.
    pub budget_tolerance: f64,

    /// Smallest admissible eigenvalue of the covariance relative to the largest.
    pub condition_floor: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            tolerance: 1e-9,
            max_iterations: 1000,
            budget_tolerance: 1e-6,
            condition_floor: DEFAULT_CONDITION_FLOOR,
        }
    }
}

impl OptimizerConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both weight bounds.
    #[must_use]
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the covariance condition floor.
    #[must_use]
    pub fn with_condition_floor(mut self, floor: f64) -> Self {
        self.condition_floor = floor;
        self
    }

    /// Checks the bounds for an `n`-asset problem.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InfeasibleConstraints` when the bounds are
    /// not finite, negative, inverted, or cannot reach a budget of one.
    pub fn check_feasible(&self, n: usize) -> PortfolioResult<()> {
        let (lower, upper) = (self.lower_bound, self.upper_bound);
        if !(lower.is_finite() && upper.is_finite()) {
            return Err(PortfolioError::infeasible(format!(
                "bounds must be finite, got [{lower}, {upper}]"
            )));
        }
        if lower < 0.0 {
            return Err(PortfolioError::infeasible(format!(
                "lower bound {lower} is negative; short positions are not allowed"
            )));
        }
        if lower > upper {
            return Err(PortfolioError::infeasible(format!(
                "lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        let count = n as f64;
        if count * upper < 1.0 - 1e-12 {
            return Err(PortfolioError::infeasible(format!(
                "{n} assets x upper bound {upper} = {} < 1",
                count * upper
            )));
        }
        if count * lower > 1.0 + 1e-12 {
            return Err(PortfolioError::infeasible(format!(
                "{n} assets x lower bound {lower} = {} > 1",
                count * lower
            )));
        }
        Ok(())
    }
}

/// How assets without an ESG score enter the ESG term.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EsgPolicy {
    /// Leave unscored assets out of the ESG term.
    #[default]
    Exclude,
    /// Assign this score to unscored assets.
    Default(f64),
    /// Fail with `MissingEsgScore`.
    Reject,
}

/// Enable flag and scale for one penalty term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermConfig {
    /// Whether the term contributes to the objective.
    pub enabled: bool,
    /// Multiplier applied to the term's value.
    pub coefficient: f64,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            coefficient: 1.0,
        }
    }
}

impl TermConfig {
    /// A disabled term.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns the active coefficient, or `None` when disabled.
    #[must_use]
    pub fn active(&self) -> Option<f64> {
        self.enabled.then_some(self.coefficient)
    }
}

/// Tax and ESG penalty settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Tax-cost term.
    pub tax: TermConfig,
    /// ESG term.
    pub esg: TermConfig,
    /// Tax jurisdiction for the rate table.
    pub jurisdiction: Jurisdiction,
    /// Treatment of assets without an ESG score.
    pub esg_policy: EsgPolicy,
}

impl PenaltyConfig {
    /// Creates a config with both terms enabled at coefficient one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with both terms disabled (pure mean-risk).
    #[must_use]
    pub fn none() -> Self {
        Self {
            tax: TermConfig::disabled(),
            esg: TermConfig::disabled(),
            ..Self::default()
        }
    }

    /// Sets the tax-cost term.
    #[must_use]
    pub fn with_tax(mut self, term: TermConfig) -> Self {
        self.tax = term;
        self
    }

    /// Sets the ESG term.
    #[must_use]
    pub fn with_esg(mut self, term: TermConfig) -> Self {
        self.esg = term;
        self
    }

    /// Sets the jurisdiction.
    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    /// Sets the missing-score policy.
    #[must_use]
    pub fn with_esg_policy(mut self, policy: EsgPolicy) -> Self {
        self.esg_policy = policy;
        self
    }

    /// Validates coefficients and the default ESG score.
    pub fn validate(&self) -> PortfolioResult<()> {
        for (name, term) in [("tax", &self.tax), ("esg", &self.esg)] {
            if !(term.coefficient.is_finite() && term.coefficient >= 0.0) {
                return Err(PortfolioError::invalid_input(format!(
                    "{name} coefficient must be non-negative, got {}",
                    term.coefficient
                )));
            }
        }
        if let EsgPolicy::Default(score) = self.esg_policy {
            if !(0.0..=100.0).contains(&score) {
                return Err(PortfolioError::invalid_input(format!(
                    "default ESG score must be within [0, 100], got {score}"
                )));
            }
        }
        Ok(())
    }
}
