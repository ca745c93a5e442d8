//! # Ballast Portfolio
//!
//! Mean-risk portfolio allocation with tax-cost and ESG penalties.
//!
//! This crate turns a snapshot of holdings and their price histories into
//! an optimized allocation:
//!
//! ```text
//! minimize   -(w · μ) + λ × sqrt(wᵀ Σ w) + tax(w) + esg(w)
//! subject to Σ w_i = 1,  lower <= w_i <= upper
//! ```
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: All inputs explicit, no I/O or caching
//! - **Fail early**: Infeasible bounds are rejected before the solver runs
//! - **Always a report**: [`optimize_portfolio`] never panics and never
//!   returns a half-built result; failures are described, not thrown
//!
//! ## Quick Start
//!
//! ```rust
//! use ballast_portfolio::prelude::*;
//!
//! let bought = Date::from_ymd(2023, 1, 1).unwrap();
//! let assets = vec![
//!     Asset::new("AAA", 10, 103.0, bought).unwrap(),
//!     Asset::new("BBB", 20, 52.0, bought).unwrap(),
//!     Asset::new("CCC", 5, 205.0, bought).unwrap(),
//! ];
//! let history = PriceHistory::new()
//!     .with("AAA", vec![100.0, 101.0, 102.0, 103.0])
//!     .with("BBB", vec![50.0, 49.0, 51.0, 52.0])
//!     .with("CCC", vec![200.0, 202.0, 201.0, 205.0]);
//!
//! let request = OptimizationRequest::new(assets, 0.1, Date::from_ymd(2024, 1, 1).unwrap())
//!     .with_optimizer(OptimizerConfig::new().with_bounds(0.05, 0.5));
//! let report = optimize_portfolio(&request, &history);
//!
//! assert!(report.success);
//! assert!((report.weight_sum() - 1.0).abs() < 1e-6);
//! ```
//!
//! ## Module Overview
//!
//! - [`estimation`] - Per-period returns, expected returns, sample covariance
//! - [`penalties`] - Risk, tax-cost and ESG penalty terms
//! - [`objective`] - Composition of the scalar objective
//! - [`optimizer`] - Budget- and box-constrained minimization
//! - [`performance`] - Return and risk of a weight vector
//! - [`problem`] - Requests and the prepared, solvable problem
//! - [`report`] - End-to-end optimization report
//! - [`frontier`] - Efficient frontier over risk tolerances

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod estimation;
pub mod frontier;
pub mod objective;
pub mod optimizer;
pub mod penalties;
pub mod performance;
pub mod problem;
pub mod report;
pub mod types;

// Re-export error types at crate root
pub use error::{ErrorKind, PortfolioError, PortfolioResult};

pub use types::{
    EsgPolicy, OptimizerConfig, PenaltyConfig, PriceHistory, TermConfig, WeightBasis,
    DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND,
};

pub use estimation::{estimate, ExcludedSeries, ReturnStatistics};
pub use frontier::{
    frontier_point, risk_tolerance_grid, tolerance_for_target_risk, trace_frontier,
    FrontierPoint,
};
pub use objective::{ObjectiveBreakdown, ObjectiveComposer};
pub use optimizer::{Allocation, ConstrainedOptimizer};
pub use penalties::{portfolio_risk, PenaltyContext, PenaltyTerm};
pub use performance::{evaluate, holding_weights, target_shares, PerformanceMetrics};
pub use problem::{CovarianceAdjustment, OptimizationRequest, PreparedProblem};
pub use report::{optimize_portfolio, OptimizationReport};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorKind, PortfolioError, PortfolioResult};

    pub use crate::types::{
        EsgPolicy, OptimizerConfig, PenaltyConfig, PriceHistory, TermConfig, WeightBasis,
    };

    pub use crate::frontier::{risk_tolerance_grid, trace_frontier, FrontierPoint};
    pub use crate::optimizer::ConstrainedOptimizer;
    pub use crate::performance::{evaluate, PerformanceMetrics};
    pub use crate::problem::{OptimizationRequest, PreparedProblem};
    pub use crate::report::{optimize_portfolio, OptimizationReport};

    pub use ballast_core::types::{Asset, Date, Jurisdiction};
}
