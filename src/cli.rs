//! Command-line flags for paperstats.
//!
//! Flags left unset fall through to `.paperstats.toml` and then to the
//! built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// PaperStats - exploratory statistics for arXiv metadata
///
/// Samples the arXiv metadata snapshot, prints dataset statistics and
/// renders category, timeline, and abstract-length charts. Falls back
/// to synthetic demo data when the snapshot is unavailable.
///
/// Examples:
///   paperstats
///   paperstats --sample-size 5000 --output-dir charts
///   paperstats --from-sample --report analysis.md
///   paperstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Maximum number of source records to sample
    ///
    /// Default: from config or 1000.
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub sample_size: Option<usize>,

    /// Raw JSON Lines metadata snapshot
    #[arg(long, value_name = "FILE", env = "PAPERSTATS_RAW_SOURCE")]
    pub raw_source: Option<PathBuf>,

    /// Location of the persisted sample table (CSV)
    #[arg(long, value_name = "FILE")]
    pub sample_path: Option<PathBuf>,

    /// Directory receiving the chart images
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file to read instead of `.paperstats.toml`
    ///
    /// If not specified, looks for .paperstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Analyze the persisted sample instead of sampling the raw source
    #[arg(long)]
    pub from_sample: bool,

    /// Write a run report to this file
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Log debug detail (per-pass results, persisted paths)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors and hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .paperstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse flags from the process arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject flag combinations that cannot run.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.sample_size == Some(0) {
            return Err("Sample size must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output_dir) = self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(format!(
                    "Output path is not a directory: {}",
                    output_dir.display()
                ));
            }
        }

        Ok(())
    }
}
