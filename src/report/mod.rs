//! Report generation and output.

pub mod generator;
pub mod writer;

pub use generator::{generate_json_report, generate_markdown_report};
pub use writer::write_report;
