//! Spectral projected gradient (Birgin, Martínez and Raydan).

use super::{
    BudgetBox, ConstrainedSolver, Objective, OptimizationConfig, OptimizationResult, Termination,
};
use crate::error::{MathError, MathResult};

/// Factor on machine epsilon below which a directional derivative is
/// indistinguishable from zero at the current objective magnitude.
const STATIONARITY_EPS_FACTOR: f64 = 100.0;

/// Spectral projected gradient solver.
///
/// Each iteration:
///
/// 1. Forms the projected step `d = P(x - α g) - x`, where `P` is the exact
///    projection onto the [`BudgetBox`] and `α` is the Barzilai-Borwein step
///    `sᵀs / sᵀy` clamped to `[min_step, max_step]`.
/// 2. Backtracks along `x + λ d` until the Armijo condition
///    `f(x + λ d) <= f(x) + c λ gᵀd` holds.
///
/// Every iterate is a convex combination of feasible points, so the
/// budget and bounds hold throughout. Convergence is declared when
/// `‖P(x - g) - x‖∞ <= tolerance`, or when a failed line search shows the
/// remaining decrease is below floating-point resolution.
///
/// Deterministic: the same inputs always give the same iterates.
///
/// # Example
///
/// ```rust
/// use ballast_math::optimization::{
///     BudgetBox, ConstrainedSolver, NumericalObjective, OptimizationConfig,
///     SpectralProjectedGradient,
/// };
///
/// // Closest point to (0.9, 0.1, 0.0) with weights in [0.1, 0.5] summing to one
/// let objective = NumericalObjective::new(|x: &[f64]| {
///     (x[0] - 0.9).powi(2) + (x[1] - 0.1).powi(2) + x[2].powi(2)
/// });
/// let set = BudgetBox::uniform(3, 0.1, 0.5);
///
/// let config = OptimizationConfig::default().with_tolerance(1e-6);
/// let result = SpectralProjectedGradient::new()
///     .minimize(&objective, &set, &[1.0 / 3.0; 3], &config)
///     .unwrap();
///
/// assert!(result.converged);
/// assert!((result.parameters[0] - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralProjectedGradient;

impl SpectralProjectedGradient {
    /// Creates a new solver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn validate(config: &OptimizationConfig) -> MathResult<()> {
    if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
        return Err(MathError::invalid_input(format!(
            "tolerance must be positive, got {}",
            config.tolerance
        )));
    }
    if !(config.sufficient_decrease > 0.0 && config.sufficient_decrease < 1.0) {
        return Err(MathError::invalid_input(format!(
            "sufficient decrease constant must lie in (0, 1), got {}",
            config.sufficient_decrease
        )));
    }
    if !(config.min_step > 0.0 && config.min_step <= config.max_step) {
        return Err(MathError::invalid_input(format!(
            "step bounds must satisfy 0 < min_step <= max_step, got [{}, {}]",
            config.min_step, config.max_step
        )));
    }
    Ok(())
}

fn projected_step(set: &BudgetBox, x: &[f64], g: &[f64], alpha: f64) -> Vec<f64> {
    let trial: Vec<f64> = x.iter().zip(g).map(|(xi, gi)| xi - alpha * gi).collect();
    set.project(&trial)
        .iter()
        .zip(x)
        .map(|(p, xi)| p - xi)
        .collect()
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

impl ConstrainedSolver for SpectralProjectedGradient {
    fn minimize(
        &self,
        objective: &dyn Objective,
        constraints: &BudgetBox,
        initial: &[f64],
        config: &OptimizationConfig,
    ) -> MathResult<OptimizationResult> {
        validate(config)?;
        constraints.check_feasible()?;
        if initial.len() != constraints.dimension() {
            return Err(MathError::dimension_mismatch(
                constraints.dimension(),
                initial.len(),
            ));
        }
        if !all_finite(initial) {
            return Err(MathError::invalid_input("initial point is not finite"));
        }

        let mut x = constraints.project(initial);
        let mut f = objective.value(&x);
        let mut g = objective.gradient(&x);

        let finish = |mut x: Vec<f64>,
                      f: f64,
                      iterations: u32,
                      termination: Termination,
                      stationarity: f64| {
            constraints.clamp(&mut x);
            tracing::debug!(
                solver = "spg",
                iterations,
                objective = f,
                stationarity,
                termination = termination.describe(),
                "optimization finished"
            );
            OptimizationResult {
                parameters: x,
                objective_value: f,
                iterations,
                converged: termination.is_converged(),
                termination,
                stationarity,
            }
        };

        if !f.is_finite() || !all_finite(&g) {
            return Ok(finish(x, f, 0, Termination::NonFinite, f64::INFINITY));
        }

        let mut stationarity = inf_norm(&projected_step(constraints, &x, &g, 1.0));
        let mut alpha = if stationarity > 0.0 {
            (1.0 / stationarity).clamp(config.min_step, config.max_step)
        } else {
            1.0
        };

        for iteration in 0..config.max_iterations {
            if stationarity <= config.tolerance {
                return Ok(finish(x, f, iteration, Termination::Converged, stationarity));
            }

            let d = projected_step(constraints, &x, &g, alpha);
            let gd = dot(&g, &d);
            let negligible = STATIONARITY_EPS_FACTOR * f64::EPSILON * (1.0 + f.abs());

            let mut lambda = 1.0;
            let mut accepted = None;
            for _ in 0..config.max_backtracks {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(&d)
                    .map(|(xi, di)| xi + lambda * di)
                    .collect();
                let f_candidate = objective.value(&candidate);
                if f_candidate.is_finite()
                    && f_candidate <= f + config.sufficient_decrease * lambda * gd
                {
                    accepted = Some((candidate, f_candidate));
                    break;
                }
                lambda *= 0.5;
            }

            let Some((x_new, f_new)) = accepted else {
                let termination = if gd.abs() <= negligible {
                    Termination::NumericalStationarity
                } else {
                    Termination::LineSearchFailed
                };
                return Ok(finish(x, f, iteration, termination, stationarity));
            };

            let g_new = objective.gradient(&x_new);
            if !all_finite(&g_new) {
                return Ok(finish(
                    x_new,
                    f_new,
                    iteration + 1,
                    Termination::NonFinite,
                    stationarity,
                ));
            }

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            alpha = if sy > 0.0 {
                (dot(&s, &s) / sy).clamp(config.min_step, config.max_step)
            } else {
                config.max_step
            };

            tracing::trace!(iteration, objective = f_new, stationarity, alpha, "spg step");

            x = x_new;
            f = f_new;
            g = g_new;
            stationarity = inf_norm(&projected_step(constraints, &x, &g, 1.0));
        }

        let termination = if stationarity <= config.tolerance {
            Termination::Converged
        } else {
            Termination::MaxIterations
        };
        Ok(finish(x, f, config.max_iterations, termination, stationarity))
    }

    fn name(&self) -> &'static str {
        "Spectral Projected Gradient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::NumericalObjective;
    use approx::assert_relative_eq;

    /// `½ xᵀ diag(d) x - cᵀ x` with analytic gradient.
    struct Quadratic {
        diag: Vec<f64>,
        linear: Vec<f64>,
    }

    impl Objective for Quadratic {
        fn value(&self, x: &[f64]) -> f64 {
            x.iter()
                .zip(&self.diag)
                .zip(&self.linear)
                .map(|((xi, d), c)| 0.5 * d * xi * xi - c * xi)
                .sum()
        }

        fn gradient(&self, x: &[f64]) -> Vec<f64> {
            x.iter()
                .zip(&self.diag)
                .zip(&self.linear)
                .map(|((xi, d), c)| d * xi - c)
                .collect()
        }
    }

    #[test]
    fn test_unconstrained_optimum_inside_box() {
        // Minimize (x-0.2)² + (y-0.3)² + (z-0.5)²: optimum already sums to one
        let objective = Quadratic {
            diag: vec![2.0; 3],
            linear: vec![0.4, 0.6, 1.0],
        };
        let set = BudgetBox::uniform(3, 0.0, 1.0);

        let result = SpectralProjectedGradient::new()
            .minimize(&objective, &set, &[1.0 / 3.0; 3], &OptimizationConfig::default())
            .unwrap();

        assert!(result.converged);
        assert_eq!(result.termination, Termination::Converged);
        assert_relative_eq!(result.parameters[0], 0.2, epsilon = 1e-8);
        assert_relative_eq!(result.parameters[1], 0.3, epsilon = 1e-8);
        assert_relative_eq!(result.parameters[2], 0.5, epsilon = 1e-8);
    }

    #[test]
    fn test_linear_objective_fills_bounds_in_order() {
        // Maximize cᵀx: greedy fill from the largest coefficient
        let objective = Quadratic {
            diag: vec![0.0; 4],
            linear: vec![0.10, 0.40, 0.20, 0.30],
        };
        let set = BudgetBox::uniform(4, 0.05, 0.40);

        let result = SpectralProjectedGradient::new()
            .minimize(&objective, &set, &[0.25; 4], &OptimizationConfig::default())
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.parameters[1], 0.40, epsilon = 1e-9);
        assert_relative_eq!(result.parameters[3], 0.40, epsilon = 1e-9);
        assert_relative_eq!(result.parameters[2], 0.15, epsilon = 1e-9);
        assert_relative_eq!(result.parameters[0], 0.05, epsilon = 1e-9);
    }

    #[test]
    fn test_badly_scaled_quadratic() {
        let objective = Quadratic {
            diag: vec![100.0, 1.0, 0.1, 10.0, 50.0],
            linear: vec![1.0, 0.5, 0.01, 2.0, 3.0],
        };
        let set = BudgetBox::uniform(5, 0.0, 0.6);

        let result = SpectralProjectedGradient::new()
            .minimize(&objective, &set, &[0.2; 5], &OptimizationConfig::default())
            .unwrap();

        assert!(result.converged, "{:?}", result.termination);
        assert!(set.contains(&result.parameters, 1e-10));
    }

    #[test]
    fn test_iterates_stay_feasible_with_numerical_gradient() {
        let objective = NumericalObjective::new(|x: &[f64]| {
            (x[0] - 0.9).powi(2) + (x[1] - 0.1).powi(2) + x[2].powi(2)
        });
        let set = BudgetBox::uniform(3, 0.1, 0.5);

        let result = SpectralProjectedGradient::new()
            .minimize(
                &objective,
                &set,
                &[0.0, 0.0, 1.0],
                &OptimizationConfig::default().with_tolerance(1e-6),
            )
            .unwrap();

        assert!(result.converged);
        assert!(set.contains(&result.parameters, 1e-10));
        assert_relative_eq!(result.parameters[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_iteration_cap_reported() {
        let objective = Quadratic {
            diag: vec![1e4, 1.0, 1e-2, 10.0, 100.0],
            linear: vec![1.0, 0.5, 0.01, 2.0, 3.0],
        };
        let set = BudgetBox::uniform(5, 0.0, 0.6);
        let config = OptimizationConfig::new(1e-14, 1);

        let result = SpectralProjectedGradient::new()
            .minimize(&objective, &set, &[0.2; 5], &config)
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.termination, Termination::MaxIterations);
        assert_eq!(result.iterations, 1);
        assert!(set.contains(&result.parameters, 1e-10));
    }

    #[test]
    fn test_zero_iterations_allowed() {
        let objective = Quadratic {
            diag: vec![2.0; 2],
            linear: vec![0.0, 2.0],
        };
        let set = BudgetBox::uniform(2, 0.0, 1.0);

        let result = SpectralProjectedGradient::new()
            .minimize(&objective, &set, &[0.5, 0.5], &OptimizationConfig::new(1e-9, 0))
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_infeasible_set_rejected() {
        let objective = NumericalObjective::new(|x: &[f64]| x.iter().sum());
        let set = BudgetBox::uniform(3, 0.05, 0.30);

        let result = SpectralProjectedGradient::new().minimize(
            &objective,
            &set,
            &[1.0 / 3.0; 3],
            &OptimizationConfig::default(),
        );

        assert!(matches!(result, Err(MathError::Infeasible { .. })));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let objective = NumericalObjective::new(|x: &[f64]| x.iter().sum());
        let set = BudgetBox::uniform(3, 0.0, 1.0);

        let result = SpectralProjectedGradient::new().minimize(
            &objective,
            &set,
            &[0.5, 0.5],
            &OptimizationConfig::default(),
        );

        assert!(matches!(result, Err(MathError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let objective = NumericalObjective::new(|x: &[f64]| x.iter().sum());
        let set = BudgetBox::uniform(2, 0.0, 1.0);

        let result = SpectralProjectedGradient::new().minimize(
            &objective,
            &set,
            &[0.5, 0.5],
            &OptimizationConfig::default().with_tolerance(0.0),
        );

        assert!(matches!(result, Err(MathError::InvalidInput { .. })));
    }

    #[test]
    fn test_non_finite_objective_reported() {
        let objective = NumericalObjective::new(|_: &[f64]| f64::NAN);
        let set = BudgetBox::uniform(2, 0.0, 1.0);

        let result = SpectralProjectedGradient::new()
            .minimize(&objective, &set, &[0.5, 0.5], &OptimizationConfig::default())
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.termination, Termination::NonFinite);
    }

    #[test]
    fn test_deterministic() {
        let objective = Quadratic {
            diag: vec![3.0, 1.0, 2.0],
            linear: vec![0.3, 0.1, 0.7],
        };
        let set = BudgetBox::uniform(3, 0.05, 0.6);
        let solver = SpectralProjectedGradient::new();
        let config = OptimizationConfig::default();

        let a = solver.minimize(&objective, &set, &[1.0 / 3.0; 3], &config).unwrap();
        let b = solver.minimize(&objective, &set, &[1.0 / 3.0; 3], &config).unwrap();

        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_solver_name() {
        assert_eq!(SpectralProjectedGradient::new().name(), "Spectral Projected Gradient");
    }
}
