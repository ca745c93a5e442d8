//! Bisection root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Bisection root-finding algorithm.
///
/// Repeatedly halves the bracket and keeps the half whose endpoints still
/// straddle zero. Works for any continuous `f`, including step-like
/// responses where derivative-based methods stall.
///
/// Requires: `f(a) * f(b) <= 0`
///
/// Terminates when the residual or the bracket half-width passes its test
/// in [`SolverConfig`], or when the midpoint can no longer be distinguished from an
/// endpoint in floating point.
///
/// # Example
///
/// ```rust
/// use ballast_math::solvers::{bisection, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
///
/// let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
pub fn bisection<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let mut lo = a.min(b);
    let mut hi = a.max(b);

    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo.is_nan() || f_hi.is_nan() {
        return Err(MathError::invalid_input("function is NaN at bracket endpoint"));
    }

    if f_lo * f_hi > 0.0 {
        return Err(MathError::InvalidBracket {
            a: lo,
            b: hi,
            fa: f_lo,
            fb: f_hi,
        });
    }

    if f_lo.abs() < config.residual_tolerance {
        return Ok(SolverResult {
            root: lo,
            residual: f_lo,
            bracket: (lo, hi),
            iterations: 0,
        });
    }
    if f_hi.abs() < config.residual_tolerance {
        return Ok(SolverResult {
            root: hi,
            residual: f_hi,
            bracket: (lo, hi),
            iterations: 0,
        });
    }

    for iteration in 0..config.max_iterations {
        let mid = lo + (hi - lo) / 2.0;
        let f_mid = f(mid);

        let exhausted = mid <= lo || mid >= hi;
        let narrow = (hi - lo) / 2.0 < config.bracket_tolerance;
        if f_mid.abs() < config.residual_tolerance || narrow || exhausted {
            return Ok(SolverResult {
                root: mid,
                residual: f_mid,
                bracket: (lo, hi),
                iterations: iteration + 1,
            });
        }

        if f_mid * f_lo < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    let mid = lo + (hi - lo) / 2.0;
    Err(MathError::convergence_failed(
        config.max_iterations,
        f(mid).abs(),
    ))
}
