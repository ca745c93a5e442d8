//! Evaluate command implementation.
//!
//! Reports the expected return and risk of the portfolio as currently held.
//! No optimization runs and no penalties apply.

use anyhow::Result;
use ballast_core::{Asset, Date};
use ballast_portfolio::{
    holding_weights, ErrorKind, ExcludedSeries, OptimizationRequest, PenaltyConfig,
    PerformanceMetrics, PortfolioResult, PreparedProblem, PriceHistory, WeightBasis,
};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{BasisArg, InputArgs};
use crate::cli::OutputFormat;
use crate::input::load_input;
use crate::output::{
    format_optional, format_percent, print_header, print_json, print_outcome, print_table,
    print_warning, KeyValue,
};
use crate::settings::Settings;

/// Arguments for the evaluate command.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Weighting of the current holdings
    #[arg(long, value_enum)]
    pub basis: Option<BasisArg>,
}

/// As-held performance of a portfolio.
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub basis: WeightBasis,
    pub weights: Map<String, Value>,
    pub performance: Option<PerformanceMetrics>,
    pub excluded: Vec<ExcludedSeries>,
    pub warnings: Vec<String>,
}

/// Evaluates the holdings as currently weighted.
pub fn evaluate_holdings(
    assets: Vec<Asset>,
    history: &PriceHistory,
    basis: WeightBasis,
) -> EvaluationReport {
    let mut report = EvaluationReport {
        success: false,
        message: String::new(),
        error_kind: None,
        basis,
        weights: Map::new(),
        performance: None,
        excluded: Vec::new(),
        warnings: Vec::new(),
    };

    let request =
        OptimizationRequest::new(assets, 0.0, Date::today()).with_penalties(PenaltyConfig::none());
    let outcome = run(&request, history, basis, &mut report);

    match outcome {
        Ok(()) => {
            report.success = true;
            report.message = format!("Evaluated on a {} basis", basis.name().to_lowercase());
        }
        Err(error) => {
            tracing::warn!(%error, "evaluation failed");
            report.message = error.to_string();
            report.error_kind = Some(error.kind());
            report.weights.clear();
            report.performance = None;
        }
    }
    report
}

fn run(
    request: &OptimizationRequest,
    history: &PriceHistory,
    basis: WeightBasis,
    report: &mut EvaluationReport,
) -> PortfolioResult<()> {
    let problem = PreparedProblem::prepare(request, history)?;
    report.excluded.clone_from(&problem.statistics().excluded);
    report.warnings = problem.warnings().to_vec();

    let weights = holding_weights(&problem.assets(), basis)?;
    report.performance = Some(problem.evaluate(&weights)?);
    report.weights = problem
        .symbols()
        .iter()
        .zip(weights.iter())
        .map(|(s, w)| (s.clone(), Value::from(*w)))
        .collect();
    Ok(())
}

/// Execute the evaluate command.
pub fn execute(args: EvaluateArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let input = load_input(&args.input.portfolio, args.input.prices.as_deref())?;
    let basis = args.basis.map_or(settings.holding_basis, Into::into);

    let report = evaluate_holdings(input.assets, &input.history, basis);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report_table(&report),
    }
    Ok(())
}

fn print_report_table(report: &EvaluationReport) {
    print_outcome(report.success, &report.message);
    for warning in &report.warnings {
        print_warning(warning);
    }

    let Some(performance) = &report.performance else {
        return;
    };

    print_header("Holdings");
    let rows: Vec<KeyValue> = report
        .weights
        .iter()
        .map(|(symbol, w)| KeyValue::new(symbol.clone(), format_percent(w.as_f64().unwrap_or(0.0))))
        .collect();
    print_table(&rows);

    print_header("Performance");
    print_table(&[
        KeyValue::from_percent("Expected return", performance.expected_return),
        KeyValue::from_percent("Risk", performance.risk),
        KeyValue::new("Return / risk", format_optional(performance.return_to_risk, 4)),
    ]);
}
