//! Config command implementation.
//!
//! Shows the effective settings and where they come from.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::cli::OutputFormat;
use crate::output::{print_header, print_info, print_json, print_success, print_table, KeyValue};
use crate::settings::Settings;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective settings
    Show,

    /// Show the settings file location
    Path,

    /// Write the default settings to a file
    Init(InitArgs),
}

/// Arguments for init subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Target file (default: the standard settings location)
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, settings: &Settings, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::Show => execute_show(settings, format),
        ConfigCommand::Path => execute_path(settings, format),
        ConfigCommand::Init(init_args) => execute_init(init_args),
    }
}

fn execute_show(settings: &Settings, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(settings),
        OutputFormat::Table => {
            print_header("Current Configuration");
            print!("{}", settings.to_toml()?);
            Ok(())
        }
    }
}

fn execute_path(settings: &Settings, format: OutputFormat) -> Result<()> {
    let path = settings.source.clone().or_else(Settings::default_path);
    let exists = path.as_ref().is_some_and(|p| p.is_file());

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "path": path,
            "exists": exists,
        })),
        OutputFormat::Table => {
            let shown = path.map_or_else(|| "-".to_string(), |p| p.display().to_string());
            print_table(&[
                KeyValue::new("Config file", shown),
                KeyValue::new(
                    "Status",
                    if exists { "exists" } else { "not created yet (using defaults)" },
                ),
            ]);
            Ok(())
        }
    }
}

fn execute_init(args: InitArgs) -> Result<()> {
    let path = args
        .path
        .or_else(Settings::default_path)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    if path.exists() && !args.force {
        print_info(&format!("{} already exists; use --force to overwrite", path.display()));
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Settings::default().to_toml()?)?;
    print_success(&format!("Wrote default settings to {}", path.display()));
    Ok(())
}
