//! Run and grade storage.
//!
//! This module handles the on-disk layout of runs: locating run
//! directories and reading/writing the grades stored inside them.

pub mod grades;
pub mod runs;

pub use grades::{load_grades, record_grade};
pub use runs::{run_id, RunStore};
