//! Data models for the publication analyzer.
//!
//! This module contains the core data structures used throughout
//! the application: sample records, their provenance, and the
//! statistics computed over them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Date layouts accepted for `update_date`, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A single bibliographic record in the sample table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Source identifier (uniqueness is not checked).
    pub id: String,
    /// Paper title.
    pub title: String,
    /// Raw author list as a single string.
    pub authors: String,
    /// Whitespace-separated category codes (e.g. `cs.AI cs.LG`).
    pub categories: String,
    /// Abstract text, possibly truncated.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Last update date, `YYYY-MM-DD` or source-native.
    pub update_date: String,
    /// Number of revisions.
    pub versions: u32,
}

impl Record {
    /// Returns the category tokens of this record.
    pub fn category_tokens(&self) -> impl Iterator<Item = &str> {
        self.categories.split_whitespace()
    }

    /// Returns the abstract length in characters.
    pub fn abstract_len(&self) -> usize {
        self.abstract_text.chars().count()
    }

    /// Returns the parsed update date, if it parses.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_update_date(&self.update_date)
    }
}

/// Parse an `update_date` value into a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, and datetime forms with a time
/// component. Returns `None` for empty or unrecognized values.
pub fn parse_update_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(value, format)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

/// Why the loader substituted synthetic data for the raw source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The raw source file does not exist.
    SourceMissing,
    /// The raw source exists but could not be read or parsed.
    SourceCorrupt(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::SourceMissing => write!(f, "raw source not found"),
            FallbackReason::SourceCorrupt(msg) => write!(f, "raw source unreadable: {}", msg),
        }
    }
}

/// Where the records of a sample came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrigin {
    /// Parsed from the raw JSON Lines source.
    RawSource { path: PathBuf },
    /// Synthesized demo data.
    Demo { reason: FallbackReason },
    /// Read back from a previously persisted sample artifact.
    Persisted { path: PathBuf },
}

impl SampleOrigin {
    /// Returns true if the sample holds synthetic demo data.
    pub fn is_demo(&self) -> bool {
        matches!(self, SampleOrigin::Demo { .. })
    }
}

impl fmt::Display for SampleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleOrigin::RawSource { path } => write!(f, "raw source ({})", path.display()),
            SampleOrigin::Demo { reason } => write!(f, "demo data ({})", reason),
            SampleOrigin::Persisted { path } => write!(f, "persisted sample ({})", path.display()),
        }
    }
}

/// A loaded sample table together with its provenance.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Records in input order.
    pub records: Vec<Record>,
    /// Provenance of the records.
    pub origin: SampleOrigin,
}

impl Sample {
    /// Number of records in the sample.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the sample holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Frequency of one category token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Number of records updated in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Summary statistics of the sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStats {
    /// Total number of records.
    pub total_records: usize,
    /// Number of distinct category tokens.
    pub unique_categories: usize,
    /// Earliest and latest parseable update date.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Most frequent category tokens, most frequent first.
    pub top_categories: Vec<CategoryCount>,
}

/// Descriptive statistics of a numeric distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}
