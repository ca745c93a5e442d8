//! Core types for portfolio allocation.

mod config;
mod history;
mod weighting;

pub use config::{
    EsgPolicy, OptimizerConfig, PenaltyConfig, TermConfig, DEFAULT_LOWER_BOUND,
    DEFAULT_UPPER_BOUND,
};
pub use history::PriceHistory;
pub use weighting::WeightBasis;
