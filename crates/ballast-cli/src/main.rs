//! Ballast CLI - Portfolio rebalancing from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Optimize for a risk tolerance
//! ballast optimize 0.5 portfolio.json --upper 0.5
//!
//! # Use a wide price CSV instead of inline histories
//! ballast optimize 0.5 portfolio.json --prices prices.csv --format table
//!
//! # Performance as currently held
//! ballast evaluate portfolio.json --basis market-value
//!
//! # Trace the frontier, or solve for a target risk
//! ballast frontier portfolio.json --from 0 --to 2 --steps 11
//! ballast frontier portfolio.json --target-risk 0.01
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod input;
mod output;
mod settings;

use cli::{Cli, Commands};
use settings::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean document
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "warn,ballast=debug"
        } else {
            "warn"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Commands::Optimize(args) => commands::optimize::execute(args, &settings, format)?,
        Commands::Evaluate(args) => commands::evaluate::execute(args, &settings, format)?,
        Commands::Frontier(args) => commands::frontier::execute(args, &settings, format)?,
        Commands::Config(args) => commands::config::execute(args, &settings, format)?,
    }

    Ok(())
}
