//! End-to-end optimization with a self-describing report.

use ballast_math::optimization::Objective;
use nalgebra::DVector;
use serde::{Serialize, Serializer};

use crate::error::{ErrorKind, PortfolioError, PortfolioResult};
use crate::estimation::ExcludedSeries;
use crate::objective::ObjectiveBreakdown;
use crate::optimizer::ConstrainedOptimizer;
use crate::performance::{target_shares, PerformanceMetrics};
use crate::problem::{
    check_risk_tolerance, CovarianceAdjustment, OptimizationRequest, PreparedProblem,
};
use crate::types::PriceHistory;

/// Serializes `(key, value)` pairs as a map, keeping their order.
#[allow(clippy::ptr_arg)]
fn ordered_map<S, V>(entries: &Vec<(String, V)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

/// Outcome of [`optimize_portfolio`].
///
/// Always well-formed. On failure `success` is false, `message` and
/// `error_kind` say why, and `weights` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    /// Whether a feasible, converged allocation was found.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Failure category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Risk tolerance used.
    pub risk_tolerance: f64,
    /// Symbols that entered the optimization, in index order.
    pub symbols: Vec<String>,
    /// Optimized weight per symbol.
    #[serde(serialize_with = "ordered_map")]
    pub weights: Vec<(String, f64)>,
    /// Objective at the solver's final point.
    pub objective_value: Option<f64>,
    /// Objective at the uniform starting point.
    pub initial_objective_value: Option<f64>,
    /// Solver iterations.
    pub iterations: u32,
    /// Symbols dropped for unusable price history.
    pub excluded: Vec<ExcludedSeries>,
    /// Covariance regularization, if applied.
    pub covariance_adjustment: Option<CovarianceAdjustment>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<String>,
    /// Performance of the holdings as currently weighted.
    pub current_performance: Option<PerformanceMetrics>,
    /// Performance of the optimized weights.
    pub optimized_performance: Option<PerformanceMetrics>,
    /// Objective decomposition at the optimized weights.
    pub breakdown: Option<ObjectiveBreakdown>,
    /// Whole shares realizing the optimized weights at the current total value.
    #[serde(serialize_with = "ordered_map")]
    pub target_shares: Vec<(String, u64)>,
}

impl OptimizationReport {
    fn empty(risk_tolerance: f64) -> Self {
        Self {
            success: false,
            message: String::new(),
            error_kind: None,
            risk_tolerance,
            symbols: Vec::new(),
            weights: Vec::new(),
            objective_value: None,
            initial_objective_value: None,
            iterations: 0,
            excluded: Vec::new(),
            covariance_adjustment: None,
            warnings: Vec::new(),
            current_performance: None,
            optimized_performance: None,
            breakdown: None,
            target_shares: Vec::new(),
        }
    }

    fn fail(&mut self, error: &PortfolioError) {
        self.success = false;
        self.message = error.to_string();
        self.error_kind = Some(error.kind());
        self.weights.clear();
        self.target_shares.clear();
        self.optimized_performance = None;
        self.breakdown = None;
    }

    /// Weight for `symbol`, if the run succeeded and the symbol was kept.
    #[must_use]
    pub fn weight(&self, symbol: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, w)| *w)
    }

    /// Sum of the optimized weights.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }
}

/// Runs estimation, penalty construction, optimization and evaluation.
///
/// Never returns an error: every failure is folded into the report with
/// `success = false`.
#[must_use]
pub fn optimize_portfolio(
    request: &OptimizationRequest,
    history: &PriceHistory,
) -> OptimizationReport {
    let mut report = OptimizationReport::empty(request.risk_tolerance);
    match run(request, history, &mut report) {
        Ok(()) => {
            tracing::info!(
                assets = report.symbols.len(),
                risk_tolerance = request.risk_tolerance,
                iterations = report.iterations,
                objective = ?report.objective_value,
                "portfolio optimized"
            );
        }
        Err(error) => {
            tracing::warn!(%error, kind = ?error.kind(), "portfolio optimization failed");
            report.fail(&error);
        }
    }
    report
}

fn run(
    request: &OptimizationRequest,
    history: &PriceHistory,
    report: &mut OptimizationReport,
) -> PortfolioResult<()> {
    check_risk_tolerance(request.risk_tolerance)?;
    let problem = PreparedProblem::prepare(request, history)?;

    report.symbols = problem.symbols().to_vec();
    report.excluded.clone_from(&problem.statistics().excluded);
    report.covariance_adjustment = problem.adjustment().copied();
    report.warnings = problem.warnings().to_vec();
    report.current_performance = match problem.current_performance(request.holding_basis) {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            report
                .warnings
                .push(format!("current performance unavailable: {error}"));
            None
        }
    };

    let optimizer = ConstrainedOptimizer::new(request.optimizer.clone());
    let composer = problem.composer(request.risk_tolerance)?;
    report.initial_objective_value =
        Some(composer.value(&ConstrainedOptimizer::initial_weights(problem.len())));

    let allocation = optimizer.optimize(&composer, problem.len())?;
    report.iterations = allocation.iterations;
    report.objective_value = Some(allocation.objective_value);
    let message = allocation.message.clone();
    let weights = allocation.into_weights()?;

    let w = DVector::from_column_slice(&weights);
    report.optimized_performance = Some(problem.evaluate(&w)?);
    report.breakdown = Some(composer.breakdown(&w));

    let symbols = problem.symbols();
    report.target_shares = symbols
        .iter()
        .cloned()
        .zip(target_shares(&problem.assets(), &weights))
        .collect();
    report.weights = symbols.iter().cloned().zip(weights).collect();
    report.success = true;
    report.message = message;
    Ok(())
}
