pub mod aggregate;
pub mod error;
pub mod filter;
pub mod identity;
pub mod metric;
pub mod normalize;
pub mod report;
pub mod thresholds;
pub mod types;
