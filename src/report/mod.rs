//! Chart rendering and run reports.

pub mod charts;
pub mod generator;

pub use charts::PlottersRenderer;
pub use generator::{generate_json_report, generate_markdown_report, RunMetadata, RunReport};
