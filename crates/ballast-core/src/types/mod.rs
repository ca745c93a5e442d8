//! Domain types for portfolio allocation.
//!
//! - [`Date`]: Calendar date for holding-period calculations
//! - [`Asset`]: A held position with its latest price and optional ESG score
//! - [`PriceSeries`]: Chronological closing prices for one asset
//! - [`Jurisdiction`]: Tax jurisdiction code

mod asset;
mod date;
mod jurisdiction;
mod series;

pub use asset::{Asset, ESG_MAX, ESG_MIN};
pub use date::Date;
pub use jurisdiction::Jurisdiction;
pub use series::PriceSeries;
