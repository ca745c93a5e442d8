//! Optimize command implementation.

use anyhow::Result;
use ballast_portfolio::{optimize_portfolio, OptimizationReport, OptimizationRequest};
use clap::Args;
use tabled::Tabled;

use super::{BasisArg, BoundArgs, InputArgs, PenaltyArgs};
use crate::cli::OutputFormat;
use crate::input::load_input;
use crate::output::{
    format_optional, format_percent, print_header, print_json, print_outcome, print_table,
    print_warning, KeyValue,
};
use crate::settings::Settings;

/// Arguments for the optimize command.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Weight on risk in the objective (non-negative)
    #[arg(allow_hyphen_values = true)]
    pub risk_tolerance: f64,

    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub bounds: BoundArgs,

    #[command(flatten)]
    pub penalties: PenaltyArgs,

    /// Weighting of the current holdings
    #[arg(long, value_enum)]
    pub basis: Option<BasisArg>,
}

/// Allocation table row.
#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Target Shares")]
    target_shares: u64,
}

/// Builds the request from settings and flags.
pub fn build_request(
    args: &OptimizeArgs,
    settings: &Settings,
    assets: Vec<ballast_core::Asset>,
) -> Result<OptimizationRequest> {
    let basis = args.basis.map_or(settings.holding_basis, Into::into);
    Ok(
        OptimizationRequest::new(assets, args.risk_tolerance, args.penalties.as_of()?)
            .with_optimizer(args.bounds.apply(settings.optimizer.clone()))
            .with_penalties(args.penalties.apply(settings.penalties.clone()))
            .with_holding_basis(basis),
    )
}

/// Execute the optimize command.
pub fn execute(args: OptimizeArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    let input = load_input(&args.input.portfolio, args.input.prices.as_deref())?;
    let request = build_request(&args, settings, input.assets)?;

    let report = optimize_portfolio(&request, &input.history);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report_table(&report),
    }
    Ok(())
}

fn print_report_table(report: &OptimizationReport) {
    print_outcome(report.success, &report.message);
    for warning in &report.warnings {
        print_warning(warning);
    }

    if report.success {
        print_header("Allocation");
        let rows: Vec<AllocationRow> = report
            .weights
            .iter()
            .zip(&report.target_shares)
            .map(|((symbol, weight), (_, shares))| AllocationRow {
                symbol: symbol.clone(),
                weight: format_percent(*weight),
                target_shares: *shares,
            })
            .collect();
        print_table(&rows);
    }

    print_header("Performance");
    let mut metrics = vec![KeyValue::from_f64("Risk tolerance", report.risk_tolerance, 4)];
    for (label, performance) in [
        ("Current", &report.current_performance),
        ("Optimized", &report.optimized_performance),
    ] {
        if let Some(p) = performance {
            metrics.push(KeyValue::from_percent(
                format!("{label} expected return"),
                p.expected_return,
            ));
            metrics.push(KeyValue::from_percent(format!("{label} risk"), p.risk));
            metrics.push(KeyValue::new(
                format!("{label} return / risk"),
                format_optional(p.return_to_risk, 4),
            ));
        }
    }
    metrics.push(KeyValue::new(
        "Objective",
        format_optional(report.objective_value, 6),
    ));
    metrics.push(KeyValue::new("Iterations", report.iterations.to_string()));
    print_table(&metrics);

    if !report.excluded.is_empty() {
        print_header("Excluded");
        let rows: Vec<KeyValue> = report
            .excluded
            .iter()
            .map(|e| KeyValue::new(e.symbol.clone(), e.reason.clone()))
            .collect();
        print_table(&rows);
    }
}
