//! Tax jurisdiction codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tax jurisdiction used to look up capital-gains rates.
///
/// Codes are matched case-insensitively. Anything other than a recognized
/// code is kept verbatim as [`Jurisdiction::Other`] and taxed at the
/// fallback rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Jurisdiction {
    /// United States.
    #[default]
    Us,
    /// Unrecognized jurisdiction code.
    Other(String),
}

impl Jurisdiction {
    /// Parses a jurisdiction code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "US" | "USA" => Self::Us,
            _ => Self::Other(code.trim().to_string()),
        }
    }

    /// Returns the jurisdiction code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Us => "US",
            Self::Other(code) => code,
        }
    }

    /// Returns true if the jurisdiction has a dedicated rate schedule.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for Jurisdiction {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Jurisdiction> for String {
    fn from(jurisdiction: Jurisdiction) -> Self {
        jurisdiction.code().to_string()
    }
}
