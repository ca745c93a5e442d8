//! # Ballast Math
//!
//! Numerical routines for the Ballast portfolio allocation library.
//!
//! This crate provides:
//!
//! - **Statistics**: Sample means and covariance matrices
//! - **Linear Algebra**: Quadratic forms and covariance regularization
//! - **Optimization**: Spectral projected gradient over a budget-and-box feasible set
//! - **Solvers**: One-dimensional bracketing root finder
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: Degenerate inputs are detected, not propagated as NaN
//! - **Bounded Work**: Every iterative routine honours an iteration cap
//! - **Solver-agnostic Callers**: Objectives and solvers meet at traits

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod linear_algebra;
pub mod optimization;
pub mod solvers;
pub mod statistics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{quadratic_form, regularize_covariance, Regularization};
    pub use crate::optimization::{
        BudgetBox, ConstrainedSolver, NumericalObjective, Objective, OptimizationConfig,
        OptimizationResult, SpectralProjectedGradient, Termination,
    };
    pub use crate::solvers::{bisection, SolverConfig, SolverResult};
    pub use crate::statistics::{mean, sample_covariance};
}

pub use error::{MathError, MathResult};
