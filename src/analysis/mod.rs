//! Analysis modules.
//!
//! Aggregation of graded runs into per-skill-set statistics.

pub mod aggregator;

pub use aggregator::*;
