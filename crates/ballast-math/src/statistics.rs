//! Sample statistics over aligned observation series.

use nalgebra::{DMatrix, DVector};

use crate::error::{MathError, MathResult};

/// Arithmetic mean of a series.
///
/// # Errors
///
/// Returns `MathError::InsufficientData` for an empty series.
pub fn mean(values: &[f64]) -> MathResult<f64> {
    if values.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Means of several series, one entry per series.
pub fn means(series: &[Vec<f64>]) -> MathResult<DVector<f64>> {
    let values = series
        .iter()
        .map(|s| mean(s))
        .collect::<MathResult<Vec<f64>>>()?;
    Ok(DVector::from_vec(values))
}

/// Sample covariance matrix (denominator `n - 1`) of equally long series.
///
/// Entry `(i, j)` is the covariance between `series[i]` and `series[j]`.
/// The result is symmetric by construction.
///
/// ## Formula
///
/// ```text
/// cov(i, j) = Σ_t (x_i[t] - mean_i) × (x_j[t] - mean_j) / (n - 1)
/// ```
///
/// # Errors
///
/// - `InsufficientData` if there are no series or fewer than two observations.
/// - `DimensionMismatch` if the series differ in length.
pub fn sample_covariance(series: &[Vec<f64>]) -> MathResult<DMatrix<f64>> {
    let k = series.len();
    if k == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }

    let n = series[0].len();
    if let Some(bad) = series.iter().find(|s| s.len() != n) {
        return Err(MathError::dimension_mismatch(n, bad.len()));
    }
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }

    let mu = means(series)?;
    let centered: Vec<Vec<f64>> = series
        .iter()
        .enumerate()
        .map(|(i, s)| s.iter().map(|x| x - mu[i]).collect())
        .collect();

    let denom = (n - 1) as f64;
    let mut cov = DMatrix::zeros(k, k);
    for i in 0..k {
        for j in i..k {
            let c: f64 = centered[i]
                .iter()
                .zip(&centered[j])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / denom;
            cov[(i, j)] = c;
            cov[(j, i)] = c;
        }
    }

    Ok(cov)
}
