//! One-dimensional root finding.
//!
//! Used where a scalar control must be tuned until a monotone response hits
//! a target, e.g. the risk tolerance that yields a requested portfolio risk.

mod bisection;

pub use bisection::bisection;

/// Stopping rules for a bracketing root search.
///
/// The search stops as soon as either test passes: the response is within
/// `residual_tolerance` of zero, or the bracket is narrower than
/// `2 × bracket_tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Accepted `|f(x)|` at the returned point.
    pub residual_tolerance: f64,
    /// Accepted half-width of the final bracket.
    pub bracket_tolerance: f64,
    /// Iteration cap; exceeding it is an error.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(1e-10, 100)
    }
}

impl SolverConfig {
    /// Uses `tolerance` for both the residual and the bracket tests.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            residual_tolerance: tolerance,
            bracket_tolerance: tolerance,
            max_iterations,
        }
    }

    /// Overrides the bracket half-width test.
    #[must_use]
    pub fn with_bracket_tolerance(mut self, tolerance: f64) -> Self {
        self.bracket_tolerance = tolerance;
        self
    }
}

/// Point returned by a root search.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// Approximate root.
    pub root: f64,
    /// `f(root)`.
    pub residual: f64,
    /// Bracket still known to contain a sign change.
    pub bracket: (f64, f64),
    /// Function evaluations after the two endpoint checks.
    pub iterations: u32,
}
