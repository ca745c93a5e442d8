//! Capital-gains tax rate lookup.
//!
//! A single table maps (holding period, jurisdiction) to a rate:
//!
//! | Jurisdiction | Short-term (<= 365 days) | Long-term (> 365 days) |
//! |--------------|--------------------------|------------------------|
//! | US           | 25%                      | 15%                    |
//! | other        | 20%                      | 20%                    |

use serde::{Deserialize, Serialize};

use crate::types::{Date, Jurisdiction};

/// Longest holding period, in days, still classified as short-term.
pub const SHORT_TERM_MAX_DAYS: i64 = 365;

/// Rate applied when a jurisdiction has no dedicated schedule.
pub const FALLBACK_RATE: f64 = 0.20;

/// Holding-period classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingPeriod {
    /// Held for at most [`SHORT_TERM_MAX_DAYS`].
    ShortTerm,
    /// Held longer than [`SHORT_TERM_MAX_DAYS`].
    LongTerm,
}

impl HoldingPeriod {
    /// Classifies a holding period given in days.
    ///
    /// Negative periods (purchase after the reference date) count as short-term.
    #[must_use]
    pub fn classify(days: i64) -> Self {
        if days <= SHORT_TERM_MAX_DAYS {
            Self::ShortTerm
        } else {
            Self::LongTerm
        }
    }
}

/// Short- and long-term rates for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    /// Rate for short-term holdings.
    pub short_term: f64,
    /// Rate for long-term holdings.
    pub long_term: f64,
}

impl TaxSchedule {
    /// Returns the schedule for a jurisdiction.
    #[must_use]
    pub fn for_jurisdiction(jurisdiction: &Jurisdiction) -> Self {
        match jurisdiction {
            Jurisdiction::Us => Self {
                short_term: 0.25,
                long_term: 0.15,
            },
            Jurisdiction::Other(_) => Self {
                short_term: FALLBACK_RATE,
                long_term: FALLBACK_RATE,
            },
        }
    }

    /// Returns the rate for a holding-period class.
    #[must_use]
    pub fn rate(&self, period: HoldingPeriod) -> f64 {
        match period {
            HoldingPeriod::ShortTerm => self.short_term,
            HoldingPeriod::LongTerm => self.long_term,
        }
    }
}

/// Looks up the capital-gains rate for a holding period and jurisdiction.
#[must_use]
pub fn tax_rate(holding_period_days: i64, jurisdiction: &Jurisdiction) -> f64 {
    TaxSchedule::for_jurisdiction(jurisdiction).rate(HoldingPeriod::classify(holding_period_days))
}

/// Days held from `purchase_date` to `as_of`, floored at zero.
#[must_use]
pub fn holding_period_days(purchase_date: Date, as_of: Date) -> i64 {
    purchase_date.days_between(&as_of).max(0)
}
