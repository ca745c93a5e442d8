//! Budget-and-box feasible set with exact Euclidean projection.

use crate::error::{MathError, MathResult};

/// Relative slack allowed when comparing bound sums against the budget.
const FEASIBILITY_SLACK: f64 = 1e-12;

/// The set `{ x : Σ x_i = budget, lower_i <= x_i <= upper_i }`.
///
/// Construction never fails on an empty set; call
/// [`check_feasible`](Self::check_feasible) before optimizing.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBox {
    lower: Vec<f64>,
    upper: Vec<f64>,
    budget: f64,
}

impl BudgetBox {
    /// Creates a feasible set with per-coordinate bounds.
    ///
    /// # Errors
    ///
    /// Returns `MathError::DimensionMismatch` if the bound vectors differ in length.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>, budget: f64) -> MathResult<Self> {
        if lower.len() != upper.len() {
            return Err(MathError::dimension_mismatch(lower.len(), upper.len()));
        }
        Ok(Self {
            lower,
            upper,
            budget,
        })
    }

    /// Creates a feasible set of `n` coordinates sharing the same bounds,
    /// with a budget of one.
    #[must_use]
    pub fn uniform(n: usize, lower: f64, upper: f64) -> Self {
        Self {
            lower: vec![lower; n],
            upper: vec![upper; n],
            budget: 1.0,
        }
    }

    /// Number of coordinates.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Lower bounds.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Verifies that the set is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `MathError::Infeasible` when a bound is not finite, a lower
    /// bound exceeds its upper bound, or the budget lies outside
    /// `[Σ lower, Σ upper]`. Returns `MathError::InvalidInput` for an
    /// empty set of coordinates.
    pub fn check_feasible(&self) -> MathResult<()> {
        if self.lower.is_empty() {
            return Err(MathError::invalid_input("feasible set has no coordinates"));
        }
        if !self.budget.is_finite() {
            return Err(MathError::infeasible(format!(
                "budget must be finite, got {}",
                self.budget
            )));
        }
        for (i, (&l, &u)) in self.lower.iter().zip(&self.upper).enumerate() {
            if !(l.is_finite() && u.is_finite()) {
                return Err(MathError::infeasible(format!(
                    "bounds for coordinate {i} are not finite: [{l}, {u}]"
                )));
            }
            if l > u {
                return Err(MathError::infeasible(format!(
                    "lower bound {l} exceeds upper bound {u} for coordinate {i}"
                )));
            }
        }

        let sum_lower: f64 = self.lower.iter().sum();
        let sum_upper: f64 = self.upper.iter().sum();
        let slack = FEASIBILITY_SLACK * self.budget.abs().max(1.0);

        if sum_lower > self.budget + slack {
            return Err(MathError::infeasible(format!(
                "lower bounds sum to {sum_lower}, above the budget {}",
                self.budget
            )));
        }
        if sum_upper < self.budget - slack {
            return Err(MathError::infeasible(format!(
                "upper bounds sum to {sum_upper}, below the budget {}",
                self.budget
            )));
        }
        Ok(())
    }

    /// Returns true if `x` satisfies the bounds exactly and the budget within `tolerance`.
    #[must_use]
    pub fn contains(&self, x: &[f64], tolerance: f64) -> bool {
        x.len() == self.dimension()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&v, (&l, &u))| v >= l && v <= u)
            && (x.iter().sum::<f64>() - self.budget).abs() <= tolerance
    }

    /// Clamps every coordinate of `x` into its box.
    pub fn clamp(&self, x: &mut [f64]) {
        for (v, (&l, &u)) in x.iter_mut().zip(self.lower.iter().zip(&self.upper)) {
            *v = (*v).clamp(l, u);
        }
    }

    /// Euclidean projection of `v` onto the set.
    ///
    /// The projection has the form `x_i = clamp(v_i - τ, lower_i, upper_i)`
    /// for a scalar shift `τ`. The budget residual
    ///
    /// ```text
    /// g(τ) = Σ clamp(v_i - τ, lower_i, upper_i) - budget
    /// ```
    ///
    /// is non-increasing and piecewise linear with kinks at `v_i - upper_i`
    /// and `v_i - lower_i`. The kinks are sorted, the segment where `g`
    /// changes sign is located by binary search, and `τ` is found by
    /// linear interpolation on that segment. No iteration tolerance is
    /// involved.
    ///
    /// The set must be feasible and `v` must have the set's dimension.
    #[must_use]
    pub fn project(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.dimension());

        let mut kinks: Vec<f64> = v
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .flat_map(|(&vi, (&l, &u))| [vi - u, vi - l])
            .collect();
        kinks.sort_by(f64::total_cmp);
        kinks.dedup();

        let residual = |tau: f64| -> f64 {
            v.iter()
                .zip(self.lower.iter().zip(&self.upper))
                .map(|(&vi, (&l, &u))| (vi - tau).clamp(l, u))
                .sum::<f64>()
                - self.budget
        };

        // residual(kinks[0]) = Σ upper - budget >= 0
        // residual(kinks[last]) = Σ lower - budget <= 0
        let mut lo = 0;
        let mut hi = kinks.len() - 1;
        let mut g_lo = residual(kinks[lo]);
        let mut g_hi = residual(kinks[hi]);

        let tau = if g_lo <= 0.0 {
            kinks[lo]
        } else if g_hi >= 0.0 {
            kinks[hi]
        } else {
            while hi - lo > 1 {
                let mid = lo + (hi - lo) / 2;
                let g_mid = residual(kinks[mid]);
                if g_mid > 0.0 {
                    lo = mid;
                    g_lo = g_mid;
                } else {
                    hi = mid;
                    g_hi = g_mid;
                }
            }
            let (t_lo, t_hi) = (kinks[lo], kinks[hi]);
            t_lo + g_lo * (t_hi - t_lo) / (g_lo - g_hi)
        };

        let mut x: Vec<f64> = v
            .iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&vi, (&l, &u))| (vi - tau).clamp(l, u))
            .collect();
        self.restore_budget(&mut x);
        x
    }

    /// Spreads any leftover budget residual over the coordinates that can
    /// still move in the needed direction.
    ///
    /// `v_i - τ` loses absolute precision when `v` is large, so the sum can
    /// miss the budget by more than rounding. An error in `τ` shifts only the
    /// coordinates strictly inside their bounds, so those absorb the residual
    /// first and coordinates sitting on a bound stay there. Each pass either
    /// clears the residual or pins at least one more coordinate to a bound.
    fn restore_budget(&self, x: &mut [f64]) {
        let n = x.len();
        let resolution = f64::EPSILON * self.budget.abs().max(1.0) * n as f64;
        for _ in 0..n {
            let residual = x.iter().sum::<f64>() - self.budget;
            if residual.abs() <= resolution {
                return;
            }
            let interior: Vec<usize> = (0..n)
                .filter(|&i| x[i] > self.lower[i] && x[i] < self.upper[i])
                .collect();
            let movable: Vec<usize> = if interior.is_empty() {
                (0..n)
                    .filter(|&i| {
                        if residual > 0.0 {
                            x[i] > self.lower[i]
                        } else {
                            x[i] < self.upper[i]
                        }
                    })
                    .collect()
            } else {
                interior
            };
            if movable.is_empty() {
                return;
            }
            let share = residual / movable.len() as f64;
            for i in movable {
                x[i] = (x[i] - share).clamp(self.lower[i], self.upper[i]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_uniform_feasible() {
        assert!(BudgetBox::uniform(5, 0.05, 0.30).check_feasible().is_ok());
        // Equality at the edge: 4 × 0.25 = 1
        assert!(BudgetBox::uniform(4, 0.0, 0.25).check_feasible().is_ok());
    }

    #[test]
    fn test_upper_too_small() {
        let set = BudgetBox::uniform(3, 0.05, 0.30);
        assert!(matches!(
            set.check_feasible(),
            Err(MathError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_lower_too_large() {
        let set = BudgetBox::uniform(5, 0.25, 0.5);
        assert!(matches!(
            set.check_feasible(),
            Err(MathError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_inverted_bounds() {
        let set = BudgetBox::uniform(4, 0.4, 0.2);
        assert!(matches!(
            set.check_feasible(),
            Err(MathError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_non_finite_bounds() {
        let set = BudgetBox::uniform(4, f64::NAN, 0.5);
        assert!(set.check_feasible().is_err());
    }

    #[test]
    fn test_empty_set() {
        let set = BudgetBox::uniform(0, 0.0, 1.0);
        assert!(matches!(
            set.check_feasible(),
            Err(MathError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_mismatched_bounds() {
        assert!(BudgetBox::new(vec![0.0; 3], vec![1.0; 2], 1.0).is_err());
    }

    #[test]
    fn test_project_interior_point_is_fixed() {
        let set = BudgetBox::uniform(3, 0.0, 1.0);
        let x = set.project(&[0.2, 0.3, 0.5]);

        assert_relative_eq!(x[0], 0.2, epsilon = 1e-15);
        assert_relative_eq!(x[1], 0.3, epsilon = 1e-15);
        assert_relative_eq!(x[2], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_project_shifts_uniformly() {
        let set = BudgetBox::uniform(2, 0.0, 1.0);
        let x = set.project(&[1.0, 1.0]);

        assert_relative_eq!(x[0], 0.5, epsilon = 1e-15);
        assert_relative_eq!(x[1], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_project_hits_bounds() {
        let set = BudgetBox::uniform(4, 0.05, 0.30);
        let x = set.project(&[10.0, 0.0, 0.0, 0.0]);

        assert_eq!(x[0], 0.30);
        assert_relative_eq!(x[1], 0.70 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(x.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_project_tight_set() {
        // Only one point is feasible
        let set = BudgetBox::uniform(4, 0.0, 0.25);
        let x = set.project(&[3.0, -1.0, 0.7, 0.1]);

        for xi in x {
            assert_relative_eq!(xi, 0.25, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_project_large_magnitudes() {
        let set = BudgetBox::uniform(3, 0.1, 0.6);
        let x = set.project(&[1e12, -1e12, 3.0]);

        assert_eq!(x[0], 0.6);
        assert_eq!(x[1], 0.1);
        assert_relative_eq!(x[2], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_project_huge_step_keeps_budget() {
        let set = BudgetBox::uniform(4, 0.05, 0.40);
        let v = [0.25 + 1e11, 0.25 + 4e11, 0.25 + 2e11, 0.25 + 3e11];

        let x = set.project(&v);

        assert!(set.contains(&x, 1e-14));
        assert_eq!(x[0], 0.05);
        assert_eq!(x[1], 0.40);
        assert_eq!(x[3], 0.40);
        assert_relative_eq!(x[2], 0.15, epsilon = 1e-14);
    }

    #[test]
    fn test_budget_residual_stays_off_the_bounds() {
        // Linear objective at a vertex, projected with the largest spectral step
        let set = BudgetBox::uniform(8, 0.05, 0.30);
        let x = [0.05, 0.05, 0.15, 0.30, 0.05, 0.05, 0.05, 0.30];
        let g = [0.0004, -0.0014, -0.0030, -0.0051, 0.0006, -0.0015, -0.0029, -0.0045];
        let v: Vec<f64> = x.iter().zip(&g).map(|(xi, gi)| xi - 1e12 * gi).collect();

        let p = set.project(&v);

        for i in [0, 1, 3, 4, 5, 6, 7] {
            assert_eq!(p[i], x[i], "coordinate {i}");
        }
        assert_relative_eq!(p[2], 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_contains_and_clamp() {
        let set = BudgetBox::uniform(2, 0.2, 0.8);
        assert!(set.contains(&[0.4, 0.6], 1e-12));
        assert!(!set.contains(&[0.1, 0.9], 1e-12));

        let mut x = [0.1, 0.9];
        set.clamp(&mut x);
        assert_eq!(x, [0.2, 0.8]);
    }

    proptest! {
        #[test]
        fn prop_projection_is_feasible(
            v in prop::collection::vec(-5.0f64..5.0, 4..12),
            lower in 0.0f64..0.08,
        ) {
            let n = v.len();
            let set = BudgetBox::uniform(n, lower, 0.5);
            prop_assume!(set.check_feasible().is_ok());

            let x = set.project(&v);

            prop_assert!(set.contains(&x, 1e-9));
        }

        #[test]
        fn prop_projection_is_idempotent(
            v in prop::collection::vec(-5.0f64..5.0, 4..12),
        ) {
            let set = BudgetBox::uniform(v.len(), 0.0, 0.5);

            let once = set.project(&v);
            let twice = set.project(&once);

            for (a, b) in once.iter().zip(&twice) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_projection_is_nearest_among_samples(
            (v, w) in (3usize..6).prop_flat_map(|n| (
                prop::collection::vec(-2.0f64..2.0, n),
                prop::collection::vec(0.0f64..1.0, n),
            )),
        ) {
            let n = v.len();
            let set = BudgetBox::uniform(n, 0.0, 1.0);

            let x = set.project(&v);
            let candidate = set.project(&w);

            let dist = |p: &[f64]| p.iter().zip(&v).map(|(a, b)| (a - b).powi(2)).sum::<f64>();
            prop_assert!(dist(&x) <= dist(&candidate) + 1e-9);
        }
    }
}
