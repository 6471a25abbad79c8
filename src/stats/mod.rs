//! Evidence accumulation and final-value resolution.
//!
//! This module turns many noisy per-frame readings into one table of
//! high-confidence values:
//! - frequency accumulation across accepted frames
//! - majority-vote resolution with a minimum-evidence threshold
//! - JSON export of the result table

pub mod aggregate;
pub mod export;
pub mod resolve;

pub use aggregate::{Aggregator, FrequencyTable};
pub use resolve::ResultTable;
