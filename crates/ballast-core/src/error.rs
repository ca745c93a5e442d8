//! Error types for the Ballast core types.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing core domain values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date parsing or an invalid calendar date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Asset metadata failed validation.
    #[error("Invalid asset '{symbol}': {reason}")]
    InvalidAsset {
        /// Asset symbol.
        symbol: String,
        /// Reason for invalidity.
        reason: String,
    },

    /// A price series cannot produce returns.
    #[error("Invalid price series: {reason}")]
    InvalidPriceSeries {
        /// Reason for invalidity.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid asset error.
    #[must_use]
    pub fn invalid_asset(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAsset {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid price series error.
    #[must_use]
    pub fn invalid_series(reason: impl Into<String>) -> Self {
        Self::InvalidPriceSeries {
            reason: reason.into(),
        }
    }
}
