//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{ConfigArgs, EvaluateArgs, FrontierArgs, OptimizeArgs};

/// Ballast - Mean-risk portfolio allocation with tax and ESG penalties
#[derive(Parser)]
#[command(name = "ballast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    pub format: OutputFormat,

    /// Settings file (TOML); defaults to <config dir>/ballast/config.toml
    #[arg(short, long, global = true, env = "BALLAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log solver progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Optimize a portfolio for a risk tolerance
    Optimize(OptimizeArgs),

    /// Report the performance of the portfolio as currently held
    Evaluate(EvaluateArgs),

    /// Trace the efficient frontier, or solve for a target risk
    Frontier(FrontierArgs),

    /// Show the effective settings
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON document on stdout
    #[default]
    Json,
    /// Human-readable tables
    Table,
}
