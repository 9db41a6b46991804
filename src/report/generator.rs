//! Run report generation.
//!
//! This module renders the results of one analysis run as a Markdown
//! document or as JSON.

use crate::models::{CategoryCount, DataStats, LengthSummary, SampleOrigin, YearCount};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata about the analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Where the analyzed records came from.
    pub origin: SampleOrigin,
    /// Location of the persisted sample table.
    pub sample_path: PathBuf,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete results of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub stats: DataStats,
    pub top_categories: Vec<CategoryCount>,
    pub timeline: Vec<YearCount>,
    pub abstracts: LengthSummary,
    /// Chart images written during the run.
    pub charts: Vec<PathBuf>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("# Publication Analysis Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_stats_section(&report.stats));
    output.push_str(&generate_categories_section(&report.top_categories));
    output.push_str(&generate_timeline_section(&report.timeline));
    output.push_str(&generate_abstracts_section(&report.abstracts));
    output.push_str(&generate_charts_section(&report.charts));

    output
}

fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Source:** {}\n", metadata.origin));
    section.push_str(&format!(
        "- **Sample Table:** `{}`\n",
        metadata.sample_path.display()
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    if metadata.origin.is_demo() {
        section.push_str("> Results describe synthetic demo data, not the real dataset.\n\n");
    }

    section
}

fn generate_stats_section(stats: &DataStats) -> String {
    let mut section = String::new();

    section.push_str("## Dataset Statistics\n\n");
    section.push_str("| Papers | Unique Categories | Date Range |\n");
    section.push_str("|:---:|:---:|:---:|\n");

    let range = match stats.date_range {
        Some((min, max)) => format!("{} to {}", min, max),
        None => "n/a".to_string(),
    };
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        stats.total_records, stats.unique_categories, range
    ));

    section
}

fn generate_categories_section(categories: &[CategoryCount]) -> String {
    let mut section = String::new();

    section.push_str("## Top Categories\n\n");
    if categories.is_empty() {
        section.push_str("No categories found.\n\n");
        return section;
    }

    section.push_str("| Rank | Category | Papers |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for (i, entry) in categories.iter().enumerate() {
        section.push_str(&format!(
            "| {} | `{}` | {} |\n",
            i + 1,
            entry.category,
            entry.count
        ));
    }
    section.push('\n');

    section
}

fn generate_timeline_section(timeline: &[YearCount]) -> String {
    let mut section = String::new();

    section.push_str("## Publication Timeline\n\n");
    if timeline.is_empty() {
        section.push_str("No dated records.\n\n");
        return section;
    }

    section.push_str("| Year | Papers |\n");
    section.push_str("|:---:|:---:|\n");
    for entry in timeline {
        section.push_str(&format!("| {} | {} |\n", entry.year, entry.count));
    }
    section.push('\n');

    section
}

fn generate_abstracts_section(summary: &LengthSummary) -> String {
    let mut section = String::new();

    section.push_str("## Abstract Lengths\n\n");
    section.push_str("| Count | Mean | Std | Min | 25% | 50% | 75% | Max |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|:---:|:---:|\n");

    let std = summary
        .std
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| "n/a".to_string());
    section.push_str(&format!(
        "| {} | {:.1} | {} | {:.0} | {:.1} | {:.1} | {:.1} | {:.0} |\n\n",
        summary.count,
        summary.mean,
        std,
        summary.min,
        summary.q25,
        summary.median,
        summary.q75,
        summary.max
    ));

    section
}

fn generate_charts_section(charts: &[PathBuf]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Charts\n\n");
    for chart in charts {
        section.push_str(&format!("- `{}`\n", chart.display()));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
