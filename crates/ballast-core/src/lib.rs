//! # Ballast Core
//!
//! Core types for the Ballast portfolio allocation library.
//!
//! This crate provides the foundational building blocks used throughout Ballast:
//!
//! - **Types**: `Date`, `Asset`, `PriceSeries`, `Jurisdiction`
//! - **Tax**: Holding-period classification and the capital-gains rate table
//!
//! ## Design Philosophy
//!
//! - **Immutable snapshots**: Assets are read, never mutated, by the engine
//! - **Validated construction**: Invalid prices and scores are rejected up front
//! - **Explicit Over Implicit**: One tax lookup, one date type
//!
//! ## Example
//!
//! ```rust
//! use ballast_core::prelude::*;
//!
//! let purchase = Date::from_ymd(2023, 1, 1).unwrap();
//! let asset = Asset::new("AAPL", 60, 150.0, purchase).unwrap().with_esg_score(75.0).unwrap();
//! assert_eq!(asset.market_value(), 9000.0);
//!
//! let as_of = Date::from_ymd(2024, 6, 1).unwrap();
//! let rate = tax_rate(purchase.days_between(&as_of), &Jurisdiction::Us);
//! assert_eq!(rate, 0.15);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod tax;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::tax::{holding_period_days, tax_rate, HoldingPeriod, TaxSchedule};
    pub use crate::types::{Asset, Date, Jurisdiction, PriceSeries};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::{Asset, Date, Jurisdiction, PriceSeries};
