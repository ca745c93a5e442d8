//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Malformed portfolio document.
    #[error("Invalid portfolio: {0}")]
    Portfolio(String),

    /// Malformed price history file.
    #[error("Invalid price history: {0}")]
    Prices(String),

    /// Settings file that cannot be read or parsed.
    #[error("Configuration error in {}: {reason}", path.display())]
    Config {
        /// Settings file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Argument outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
