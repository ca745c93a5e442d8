//! Linear algebra utilities.
//!
//! Quadratic forms and the covariance conditioning check used before
//! optimization.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

/// Default ratio between the smallest admissible and the largest eigenvalue.
///
/// Matrices whose condition number exceeds `1 / DEFAULT_CONDITION_FLOOR`
/// are shifted along the identity.
pub const DEFAULT_CONDITION_FLOOR: f64 = 1e-8;

/// Absolute eigenvalue floor used when the matrix is entirely zero.
pub const ABSOLUTE_EIGEN_FLOOR: f64 = 1e-12;

/// Computes `xᵀ M x`.
///
/// # Errors
///
/// Returns `MathError::DimensionMismatch` if `x` does not match `M`.
pub fn quadratic_form(m: &DMatrix<f64>, x: &DVector<f64>) -> MathResult<f64> {
    if m.nrows() != m.ncols() {
        return Err(MathError::invalid_input("Matrix must be square"));
    }
    if m.nrows() != x.len() {
        return Err(MathError::dimension_mismatch(m.nrows(), x.len()));
    }
    Ok(x.dot(&(m * x)))
}

/// Returns true if `m` is square and symmetric within `tolerance`.
#[must_use]
pub fn is_symmetric(m: &DMatrix<f64>, tolerance: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if (m[(i, j)] - m[(j, i)]).abs() > tolerance {
                return false;
            }
        }
    }
    true
}

/// Outcome of [`regularize_covariance`].
#[derive(Debug, Clone)]
pub struct Regularization {
    /// The (possibly shifted) matrix.
    pub matrix: DMatrix<f64>,
    /// Multiple of the identity that was added. Zero if untouched.
    pub ridge: f64,
    /// Smallest eigenvalue before the shift.
    pub min_eigenvalue: f64,
    /// Largest eigenvalue before the shift.
    pub max_eigenvalue: f64,
}

impl Regularization {
    /// Returns true if the matrix was modified.
    #[must_use]
    pub fn was_adjusted(&self) -> bool {
        self.ridge > 0.0
    }
}

/// Ensures a covariance matrix is positive definite and well-conditioned.
///
/// Computes the symmetric eigen-decomposition. If the smallest eigenvalue
/// is below `condition_floor × max(λ_max, 0)` (or below
/// [`ABSOLUTE_EIGEN_FLOOR`] for a zero matrix), adds
/// `ridge × I` so that the smallest eigenvalue lands exactly on that floor.
///
/// The input is symmetrized as `(M + Mᵀ) / 2` first.
///
/// # Errors
///
/// Returns `MathError::InvalidInput` if the matrix is not square, is empty,
/// or contains non-finite entries.
pub fn regularize_covariance(
    m: &DMatrix<f64>,
    condition_floor: f64,
) -> MathResult<Regularization> {
    if m.nrows() != m.ncols() {
        return Err(MathError::invalid_input("Covariance matrix must be square"));
    }
    if m.nrows() == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input(
            "Covariance matrix has non-finite entries",
        ));
    }
    if !(condition_floor.is_finite() && condition_floor >= 0.0) {
        return Err(MathError::invalid_input(format!(
            "condition floor must be non-negative, got {condition_floor}"
        )));
    }

    let symmetric = (m + m.transpose()) * 0.5;
    let eigen = symmetric.clone().symmetric_eigen();
    let min_eigenvalue = eigen
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let max_eigenvalue = eigen
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let floor = (condition_floor * max_eigenvalue.max(0.0)).max(ABSOLUTE_EIGEN_FLOOR);
    let ridge = if min_eigenvalue < floor {
        floor - min_eigenvalue
    } else {
        0.0
    };

    let n = symmetric.nrows();
    let matrix = if ridge > 0.0 {
        symmetric + DMatrix::identity(n, n) * ridge
    } else {
        symmetric
    };

    Ok(Regularization {
        matrix,
        ridge,
        min_eigenvalue,
        max_eigenvalue,
    })
}
