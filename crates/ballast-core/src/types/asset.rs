//! Asset (held position) representation.

use serde::{Deserialize, Serialize};

use super::Date;
use crate::error::{CoreError, CoreResult};

/// Lowest admissible ESG score.
pub const ESG_MIN: f64 = 0.0;

/// Highest admissible ESG score.
pub const ESG_MAX: f64 = 100.0;

/// A single position in a portfolio snapshot.
///
/// Owned by the caller. The allocation engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique symbol.
    pub symbol: String,

    /// Whole shares held.
    pub shares: u64,

    /// Latest price per share.
    pub price: f64,

    /// Date the position was opened.
    pub purchase_date: Date,

    /// Sustainability score in [0, 100], if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg_score: Option<f64>,
}

impl Asset {
    /// Creates a validated asset without an ESG score.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAsset` if the symbol is blank or the price is
    /// not a positive finite number.
    pub fn new(
        symbol: impl Into<String>,
        shares: u64,
        price: f64,
        purchase_date: Date,
    ) -> CoreResult<Self> {
        let asset = Self {
            symbol: symbol.into(),
            shares,
            price,
            purchase_date,
            esg_score: None,
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Sets the ESG score.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAsset` if the score is outside [0, 100].
    pub fn with_esg_score(mut self, score: f64) -> CoreResult<Self> {
        self.esg_score = Some(score);
        self.validate()?;
        Ok(self)
    }

    /// Checks the invariants of a deserialized or hand-built asset.
    pub fn validate(&self) -> CoreResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(CoreError::invalid_asset(&self.symbol, "symbol is empty"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(CoreError::invalid_asset(
                &self.symbol,
                format!("price must be positive, got {}", self.price),
            ));
        }
        if let Some(score) = self.esg_score {
            if !(ESG_MIN..=ESG_MAX).contains(&score) {
                return Err(CoreError::invalid_asset(
                    &self.symbol,
                    format!("ESG score must be within [0, 100], got {score}"),
                ));
            }
        }
        Ok(())
    }

    /// Returns the position's market value (shares × price).
    #[must_use]
    pub fn market_value(&self) -> f64 {
        self.shares as f64 * self.price
    }
}
