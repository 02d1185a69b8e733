//! Cross-tool metrics aggregation: merge, rollup, baseline diff, suppression
//! correlation.

pub mod arena;
pub mod baseline;
pub mod engine;
pub mod merge;
pub mod rollup;
pub mod suppression;

pub use engine::Engine;
