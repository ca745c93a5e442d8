//! Error types for portfolio allocation.
//!
//! This module defines the error types used throughout the portfolio crate.

use ballast_core::CoreError;
use ballast_math::MathError;
use serde::Serialize;
use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that can occur during portfolio allocation.
#[derive(Error, Debug, Clone)]
pub enum PortfolioError {
    /// Too few assets with usable price history.
    #[error("Insufficient data: {usable} usable asset(s), at least {required} required")]
    InsufficientData {
        /// Number of assets that survived estimation.
        usable: usize,
        /// Minimum number required.
        required: usize,
    },

    /// Return series of different lengths.
    #[error("Data alignment: '{symbol}' has {actual} returns, expected {expected}")]
    DataAlignment {
        /// The first misaligned symbol.
        symbol: String,
        /// Return count of the first usable series.
        expected: usize,
        /// Return count of `symbol`.
        actual: usize,
    },

    /// Bounds cannot meet the budget.
    #[error("Infeasible constraints: {reason}")]
    InfeasibleConstraints {
        /// Why no weight vector can satisfy the constraints.
        reason: String,
    },

    /// The solver stopped without meeting its convergence test.
    #[error("Solver did not converge after {iterations} iteration(s): {reason}")]
    SolverNonConvergence {
        /// Iterations performed.
        iterations: u32,
        /// Why the solver stopped.
        reason: String,
    },

    /// An asset has no ESG score and the policy rejects that.
    #[error("Missing ESG score for '{symbol}'")]
    MissingEsgScore {
        /// The unscored symbol.
        symbol: String,
    },

    /// Invalid caller input.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// The reason the input is invalid.
        reason: String,
    },

    /// Numerical routine failure.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Core type validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Stable, serializable tag for each error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// See [`PortfolioError::InsufficientData`].
    InsufficientData,
    /// See [`PortfolioError::DataAlignment`].
    DataAlignment,
    /// See [`PortfolioError::InfeasibleConstraints`].
    InfeasibleConstraints,
    /// See [`PortfolioError::SolverNonConvergence`].
    SolverNonConvergence,
    /// See [`PortfolioError::MissingEsgScore`].
    MissingEsgScore,
    /// Invalid input, including core validation failures.
    InvalidInput,
    /// Other numerical failures.
    Numerical,
}

impl PortfolioError {
    /// Create an insufficient data error.
    #[must_use]
    pub fn insufficient_data(usable: usize) -> Self {
        Self::InsufficientData {
            usable,
            required: 2,
        }
    }

    /// Create an infeasible constraints error.
    #[must_use]
    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self::InfeasibleConstraints {
            reason: reason.into(),
        }
    }

    /// Create a solver non-convergence error.
    #[must_use]
    pub fn non_convergence(iterations: u32, reason: impl Into<String>) -> Self {
        Self::SolverNonConvergence {
            iterations,
            reason: reason.into(),
        }
    }

    /// Create a missing ESG score error.
    #[must_use]
    pub fn missing_esg(symbol: impl Into<String>) -> Self {
        Self::MissingEsgScore {
            symbol: symbol.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData { .. } | Self::Math(MathError::InsufficientData { .. }) => {
                ErrorKind::InsufficientData
            }
            Self::DataAlignment { .. } => ErrorKind::DataAlignment,
            Self::InfeasibleConstraints { .. } | Self::Math(MathError::Infeasible { .. }) => {
                ErrorKind::InfeasibleConstraints
            }
            Self::SolverNonConvergence { .. } | Self::Math(MathError::ConvergenceFailed { .. }) => {
                ErrorKind::SolverNonConvergence
            }
            Self::MissingEsgScore { .. } => ErrorKind::MissingEsgScore,
            Self::InvalidInput { .. }
            | Self::Core(_)
            | Self::Math(MathError::InvalidInput { .. }) => ErrorKind::InvalidInput,
            Self::Math(_) => ErrorKind::Numerical,
        }
    }
}
