//! CLI command implementations.

pub mod config;
pub mod evaluate;
pub mod frontier;
pub mod optimize;

// Re-export submodules for convenience
pub use config::ConfigArgs;
pub use evaluate::EvaluateArgs;
pub use frontier::FrontierArgs;
pub use optimize::OptimizeArgs;

use std::path::PathBuf;

use ballast_core::{Date, Jurisdiction};
use ballast_portfolio::{EsgPolicy, OptimizerConfig, PenaltyConfig, TermConfig, WeightBasis};
use clap::{Args, ValueEnum};

use crate::error::{CliError, CliResult};
use crate::input::parse_as_of;

/// Portfolio document and price history file.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Portfolio JSON (inline, a file path, or - for stdin):
    /// symbol -> {shares, price, purchase_date, esg_score?, prices?}
    pub portfolio: String,

    /// Wide price history CSV (one column per symbol)
    #[arg(short, long)]
    pub prices: Option<PathBuf>,
}

/// Weight bounds and solver overrides.
#[derive(Args, Debug, Default)]
pub struct BoundArgs {
    /// Minimum weight per asset
    #[arg(long)]
    pub lower: Option<f64>,

    /// Maximum weight per asset
    #[arg(long)]
    pub upper: Option<f64>,

    /// Solver convergence tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Solver iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

impl BoundArgs {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: OptimizerConfig) -> OptimizerConfig {
        if let Some(lower) = self.lower {
            config.lower_bound = lower;
        }
        if let Some(upper) = self.upper {
            config.upper_bound = upper;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        config
    }
}

/// Penalty term overrides.
#[derive(Args, Debug, Default)]
pub struct PenaltyArgs {
    /// Drop the tax-cost term
    #[arg(long)]
    pub no_tax: bool,

    /// Drop the ESG term
    #[arg(long)]
    pub no_esg: bool,

    /// Scale of the tax-cost term
    #[arg(long)]
    pub tax_coefficient: Option<f64>,

    /// Scale of the ESG term
    #[arg(long)]
    pub esg_coefficient: Option<f64>,

    /// Score assumed for holdings without an ESG score
    #[arg(long, conflicts_with = "reject_missing_esg")]
    pub esg_default: Option<f64>,

    /// Fail when a holding has no ESG score
    #[arg(long)]
    pub reject_missing_esg: bool,

    /// Tax jurisdiction code (e.g. US)
    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Reference date for holding periods (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<String>,
}

impl PenaltyArgs {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: PenaltyConfig) -> PenaltyConfig {
        apply_term(&mut config.tax, self.no_tax, self.tax_coefficient);
        apply_term(&mut config.esg, self.no_esg, self.esg_coefficient);
        if let Some(score) = self.esg_default {
            config.esg_policy = EsgPolicy::Default(score);
        }
        if self.reject_missing_esg {
            config.esg_policy = EsgPolicy::Reject;
        }
        if let Some(code) = &self.jurisdiction {
            config.jurisdiction = Jurisdiction::from_code(code);
        }
        config
    }

    /// The tax reference date.
    pub fn as_of(&self) -> CliResult<Date> {
        parse_as_of(self.as_of.as_deref())
    }
}

fn apply_term(term: &mut TermConfig, disabled: bool, coefficient: Option<f64>) {
    if disabled {
        term.enabled = false;
    }
    if let Some(c) = coefficient {
        term.coefficient = c;
    }
}

/// How current holdings are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BasisArg {
    /// Share counts
    Shares,
    /// Shares times latest price
    MarketValue,
    /// Equal weights
    Equal,
}

impl From<BasisArg> for WeightBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Shares => Self::Shares,
            BasisArg::MarketValue => Self::MarketValue,
            BasisArg::Equal => Self::Equal,
        }
    }
}

/// Validates a grid step count.
pub fn validate_steps(steps: usize) -> CliResult<usize> {
    if steps == 0 {
        return Err(CliError::InvalidArgument(
            "--steps must be at least 1".to_string(),
        ));
    }
    Ok(steps)
}
