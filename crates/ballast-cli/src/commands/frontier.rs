//! Frontier command implementation.

use anyhow::Result;
use ballast_core::Asset;
use ballast_portfolio::{
    risk_tolerance_grid, tolerance_for_target_risk, trace_frontier, ConstrainedOptimizer,
    ErrorKind, FrontierPoint, OptimizationRequest, PortfolioResult, PreparedProblem, PriceHistory,
};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use super::{validate_steps, BoundArgs, InputArgs, PenaltyArgs};
use crate::cli::OutputFormat;
use crate::input::load_input;
use crate::output::{
    format_percent, print_header, print_json, print_outcome, print_table, print_warning,
};
use crate::settings::Settings;

/// Arguments for the frontier command.
#[derive(Args, Debug)]
pub struct FrontierArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub bounds: BoundArgs,

    #[command(flatten)]
    pub penalties: PenaltyArgs,

    /// Lowest risk tolerance
    #[arg(long, default_value = "0.0")]
    pub from: f64,

    /// Highest risk tolerance
    #[arg(long, default_value = "2.0")]
    pub to: f64,

    /// Number of points
    #[arg(long, default_value = "11")]
    pub steps: usize,

    /// Solve for the tolerance that reaches this risk instead of tracing a grid
    #[arg(long)]
    pub target_risk: Option<f64>,
}

/// Frontier trace, or a single point hitting a target risk.
#[derive(Debug, Serialize)]
pub struct FrontierReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub symbols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_risk: Option<f64>,
    pub points: Vec<FrontierPoint>,
    pub warnings: Vec<String>,
}

#[derive(Tabled)]
struct FrontierRow {
    #[tabled(rename = "Risk Tolerance")]
    risk_tolerance: String,
    #[tabled(rename = "Expected Return")]
    expected_return: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Objective")]
    objective: String,
}

impl From<&FrontierPoint> for FrontierRow {
    fn from(point: &FrontierPoint) -> Self {
        Self {
            risk_tolerance: format!("{:.4}", point.risk_tolerance),
            expected_return: format_percent(point.expected_return),
            risk: format_percent(point.risk),
            objective: format!("{:.6}", point.objective_value),
        }
    }
}

/// Traces the frontier over `tolerances`, or bisects `[from, to]` for
/// `target_risk` when one is given.
pub fn build_frontier(
    request: &OptimizationRequest,
    history: &PriceHistory,
    tolerances: &[f64],
    target_risk: Option<f64>,
) -> FrontierReport {
    let mut report = FrontierReport {
        success: false,
        message: String::new(),
        error_kind: None,
        symbols: Vec::new(),
        target_risk,
        points: Vec::new(),
        warnings: Vec::new(),
    };

    let outcome = run(request, history, tolerances, target_risk, &mut report);

    match outcome {
        Ok(points) => {
            report.success = true;
            report.message = match target_risk {
                Some(target) => format!("Risk {target} reached"),
                None => format!("Traced {} frontier points", points.len()),
            };
            report.points = points;
        }
        Err(error) => {
            tracing::warn!(%error, "frontier failed");
            report.message = error.to_string();
            report.error_kind = Some(error.kind());
        }
    }
    report
}

fn run(
    request: &OptimizationRequest,
    history: &PriceHistory,
    tolerances: &[f64],
    target_risk: Option<f64>,
    report: &mut FrontierReport,
) -> PortfolioResult<Vec<FrontierPoint>> {
    let problem = PreparedProblem::prepare(request, history)?;
    report.symbols = problem.symbols().to_vec();
    report.warnings = problem.warnings().to_vec();

    let optimizer = ConstrainedOptimizer::new(request.optimizer.clone());
    match target_risk {
        Some(target) => {
            let low = tolerances.first().copied().unwrap_or(0.0);
            let high = tolerances.last().copied().unwrap_or(low);
            let point = tolerance_for_target_risk(&problem, &optimizer, target, low, high)?;
            Ok(vec![point])
        }
        None => trace_frontier(&problem, &optimizer, tolerances),
    }
}

/// Execute the frontier command.
pub fn execute(args: FrontierArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let steps = validate_steps(args.steps)?;
    let input = load_input(&args.input.portfolio, args.input.prices.as_deref())?;
    let request = build_request(&args, settings, input.assets)?;

    let tolerances = match args.target_risk {
        Some(_) => vec![args.from, args.to],
        None => risk_tolerance_grid(args.from, args.to, steps)?,
    };
    let report = build_frontier(&request, &input.history, &tolerances, args.target_risk);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_outcome(report.success, &report.message);
            for warning in &report.warnings {
                print_warning(warning);
            }
            if report.success {
                print_header("Frontier");
                let rows: Vec<FrontierRow> = report.points.iter().map(FrontierRow::from).collect();
                print_table(&rows);
            }
        }
    }
    Ok(())
}

fn build_request(
    args: &FrontierArgs,
    settings: &Settings,
    assets: Vec<Asset>,
) -> Result<OptimizationRequest> {
    Ok(
        OptimizationRequest::new(assets, args.from, args.penalties.as_of()?)
            .with_optimizer(args.bounds.apply(settings.optimizer.clone()))
            .with_penalties(args.penalties.apply(settings.penalties.clone()))
            .with_holding_basis(settings.holding_basis),
    )
}
