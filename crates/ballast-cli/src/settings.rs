//! Settings file loading.
//!
//! Precedence: command-line flags, then the settings file, then the
//! library defaults.

use std::path::{Path, PathBuf};

use anyhow::Result;
use ballast_portfolio::{OptimizerConfig, PenaltyConfig, WeightBasis};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Settings read from `config.toml`.
///
/// ```toml
/// holding_basis = "market_value"
///
/// [optimizer]
/// lower_bound = 0.02
/// upper_bound = 0.25
///
/// [penalties]
/// jurisdiction = "US"
/// esg_policy = { default = 50.0 }
///
/// [penalties.tax]
/// coefficient = 2.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How current holdings are turned into weights.
    pub holding_basis: WeightBasis,
    /// Bounds and solver settings.
    pub optimizer: OptimizerConfig,
    /// Tax and ESG settings.
    pub penalties: PenaltyConfig,
    /// File the settings came from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ballast").join("config.toml"))
    }

    /// Loads settings from `explicit`, or from the default location if a
    /// file exists there, or falls back to defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self::read(path)?),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Ok(Self::read(&path)?),
                None => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self, CliError> {
        let config_error = |reason: String| CliError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let mut settings = Self::parse(&text).map_err(config_error)?;
        settings.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parses settings from TOML text.
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Renders the settings as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
