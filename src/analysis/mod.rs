//! Analysis passes over the sample table.
//!
//! `aggregator` holds the pure computations; `analyzer` runs each pass
//! and hands the result to a chart renderer.

pub mod aggregator;
pub mod analyzer;

pub use aggregator::*;
pub use analyzer::PublicationAnalyzer;

use crate::report::charts::PlotError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an analysis pass.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("record '{id}' has an unparseable update_date '{value}'")]
    InvalidDate { id: String, value: String },

    #[error("cannot summarize an empty table")]
    EmptyInput,

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Plot(#[from] PlotError),
}
