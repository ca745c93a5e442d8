//! Efficient frontier tracing.
//!
//! Optimized risk is non-increasing in the risk tolerance, so a grid of
//! tolerances traces the frontier from aggressive to defensive, and a
//! target risk can be hit by bisection on the tolerance.

use std::cell::RefCell;

use ballast_math::solvers::{bisection, SolverConfig};
use ballast_math::MathError;
use nalgebra::DVector;
use serde::Serialize;

use crate::error::{PortfolioError, PortfolioResult};
use crate::optimizer::ConstrainedOptimizer;
use crate::problem::{check_risk_tolerance, PreparedProblem};

/// One optimized point on the frontier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontierPoint {
    /// Risk tolerance the point was optimized for.
    pub risk_tolerance: f64,
    /// Expected return of the optimized weights.
    pub expected_return: f64,
    /// Risk of the optimized weights.
    pub risk: f64,
    /// Objective value at the optimum.
    pub objective_value: f64,
    /// Optimized weights in index order.
    pub weights: Vec<f64>,
}

/// `steps` evenly spaced risk tolerances from `from` to `to` inclusive.
///
/// # Errors
///
/// Returns `InvalidInput` if either end is negative or not finite, or if
/// `steps` is zero, or if `steps` is one with `from != to`.
pub fn risk_tolerance_grid(from: f64, to: f64, steps: usize) -> PortfolioResult<Vec<f64>> {
    check_risk_tolerance(from)?;
    check_risk_tolerance(to)?;
    match steps {
        0 => Err(PortfolioError::invalid_input("frontier needs at least one step")),
        1 if from == to => Ok(vec![from]),
        1 => Err(PortfolioError::invalid_input(
            "a single step needs equal endpoints",
        )),
        _ => {
            let span = (to - from) / (steps - 1) as f64;
            Ok((0..steps)
                .map(|i| if i == steps - 1 { to } else { from + span * i as f64 })
                .collect())
        }
    }
}

/// Optimizes at `risk_tolerance` and evaluates the result.
///
/// # Errors
///
/// Propagates preparation and feasibility errors; a non-converged solve
/// is `SolverNonConvergence`.
pub fn frontier_point(
    problem: &PreparedProblem,
    optimizer: &ConstrainedOptimizer,
    risk_tolerance: f64,
) -> PortfolioResult<FrontierPoint> {
    let (_, allocation) = problem.solve(risk_tolerance, optimizer)?;
    let objective_value = allocation.objective_value;
    let weights = allocation.into_weights()?;
    let metrics = problem.evaluate(&DVector::from_column_slice(&weights))?;
    Ok(FrontierPoint {
        risk_tolerance,
        expected_return: metrics.expected_return,
        risk: metrics.risk,
        objective_value,
        weights,
    })
}

/// Optimizes at each tolerance in order.
///
/// # Errors
///
/// Fails on the first point that cannot be optimized.
pub fn trace_frontier(
    problem: &PreparedProblem,
    optimizer: &ConstrainedOptimizer,
    tolerances: &[f64],
) -> PortfolioResult<Vec<FrontierPoint>> {
    let points = tolerances
        .iter()
        .map(|&lambda| frontier_point(problem, optimizer, lambda))
        .collect::<PortfolioResult<Vec<_>>>()?;
    tracing::debug!(points = points.len(), "traced frontier");
    Ok(points)
}

/// Finds a risk tolerance within `[low, high]` whose optimized risk is
/// `target_risk`.
///
/// # Errors
///
/// - `InvalidInput` if the target is not reachable within the bracket.
/// - Any error from the underlying optimizations.
pub fn tolerance_for_target_risk(
    problem: &PreparedProblem,
    optimizer: &ConstrainedOptimizer,
    target_risk: f64,
    low: f64,
    high: f64,
) -> PortfolioResult<FrontierPoint> {
    if !(target_risk.is_finite() && target_risk >= 0.0) {
        return Err(PortfolioError::invalid_input(format!(
            "target risk must be non-negative, got {target_risk}"
        )));
    }
    check_risk_tolerance(low)?;
    check_risk_tolerance(high)?;

    let failure: RefCell<Option<PortfolioError>> = RefCell::new(None);
    let excess_risk = |lambda: f64| match frontier_point(problem, optimizer, lambda) {
        Ok(point) => point.risk - target_risk,
        Err(error) => {
            failure.borrow_mut().get_or_insert(error);
            f64::NAN
        }
    };

    let solved = bisection(excess_risk, low, high, &SolverConfig::new(1e-8, 200));
    if let Some(error) = failure.into_inner() {
        return Err(error);
    }

    match solved {
        Ok(result) => frontier_point(problem, optimizer, result.root),
        Err(MathError::InvalidBracket { fa, fb, .. }) => Err(PortfolioError::invalid_input(format!(
            "target risk {target_risk} is outside the reachable range [{}, {}]",
            target_risk + fa.min(fb),
            target_risk + fa.max(fb)
        ))),
        Err(error) => Err(error.into()),
    }
}
