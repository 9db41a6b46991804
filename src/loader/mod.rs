//! Sample loading from the raw metadata snapshot.
//!
//! This module streams the JSON Lines snapshot into a bounded sample
//! table, persists it as CSV, and substitutes synthetic demo data when
//! the snapshot is missing or unreadable.

pub mod demo;
pub mod sample_file;

use crate::analysis::category_frequencies;
use crate::config::Config;
use crate::models::{DataStats, FallbackReason, Record, Sample, SampleOrigin};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while reading the raw source or the sample artifact.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("raw source not found: {0}")]
    SourceMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("raw source contains no records: {0}")]
    EmptySource(PathBuf),

    #[error("sample table error: {0}")]
    Csv(#[from] csv::Error),
}

impl LoadError {
    /// Classify this error as a fallback reason.
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            LoadError::SourceMissing(_) => FallbackReason::SourceMissing,
            other => FallbackReason::SourceCorrupt(other.to_string()),
        }
    }
}

/// One line of the raw snapshot. Absent and `null` keys become defaults.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Option<String>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    update_date: Option<String>,
    #[serde(default)]
    versions: Option<Vec<serde_json::Value>>,
}

/// Loads, persists, and summarizes sample tables.
#[derive(Debug, Clone)]
pub struct DataLoader {
    raw_source: PathBuf,
    sample_path: PathBuf,
    abstract_max_chars: usize,
    truncation_marker: String,
    show_progress: bool,
}

impl DataLoader {
    /// Create a loader for the given source and artifact paths.
    pub fn new(raw_source: PathBuf, sample_path: PathBuf) -> Self {
        Self {
            raw_source,
            sample_path,
            abstract_max_chars: 200,
            truncation_marker: "...".to_string(),
            show_progress: false,
        }
    }

    /// Create a loader from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            abstract_max_chars: config.sampling.abstract_max_chars,
            truncation_marker: config.sampling.truncation_marker.clone(),
            ..Self::new(
                config.paths.raw_source.clone(),
                config.paths.sample_path.clone(),
            )
        }
    }

    /// Enable or disable the progress bar while reading the source.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Path of the persisted sample table.
    pub fn sample_path(&self) -> &Path {
        &self.sample_path
    }

    /// Build a sample of at most `sample_size` records from the raw source.
    ///
    /// Never fails: a missing or unreadable source yields the 100-record
    /// demo data set instead, with the reason recorded in the origin.
    pub fn create_sample(&self, sample_size: usize) -> Sample {
        info!("Creating sample from {}", self.raw_source.display());

        match self.sample_from_source(sample_size) {
            Ok(records) => {
                info!(
                    "Sample created with {} records from {}",
                    records.len(),
                    self.raw_source.display()
                );
                Sample {
                    records,
                    origin: SampleOrigin::RawSource {
                        path: self.raw_source.clone(),
                    },
                }
            }
            Err(e @ LoadError::SourceMissing(_)) => {
                warn!("{}; using demo data instead", e);
                self.create_demo_data()
            }
            Err(e) => {
                warn!("Failed to read raw source: {}; using demo data instead", e);
                self.demo_sample(e.fallback_reason())
            }
        }
    }

    /// Generate and persist the synthetic demo data set.
    pub fn create_demo_data(&self) -> Sample {
        self.demo_sample(FallbackReason::SourceMissing)
    }

    /// Read the persisted sample table back.
    pub fn load_sample(&self) -> Result<Sample, LoadError> {
        let records = sample_file::read_sample(&self.sample_path)?;
        info!(
            "Loaded {} records from {}",
            records.len(),
            self.sample_path.display()
        );
        Ok(Sample {
            records,
            origin: SampleOrigin::Persisted {
                path: self.sample_path.clone(),
            },
        })
    }

    fn demo_sample(&self, reason: FallbackReason) -> Sample {
        let records = demo::generate_records();

        if let Err(e) = sample_file::write_sample(&self.sample_path, &records) {
            warn!(
                "Failed to persist demo data to {}: {}",
                self.sample_path.display(),
                e
            );
        } else {
            debug!("Demo data persisted to {}", self.sample_path.display());
        }

        info!("Demo data created with {} records", records.len());
        Sample {
            records,
            origin: SampleOrigin::Demo { reason },
        }
    }

    /// Stream the source, then persist. Any error abandons the partial result.
    fn sample_from_source(&self, sample_size: usize) -> Result<Vec<Record>, LoadError> {
        if !self.raw_source.exists() {
            return Err(LoadError::SourceMissing(self.raw_source.clone()));
        }

        let file = File::open(&self.raw_source)?;
        let progress = self.progress_bar(sample_size);
        let mut records = Vec::with_capacity(sample_size.min(10_000));

        // Blank lines are skipped and do not count toward the bound
        let lines = BufReader::new(file)
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .take(sample_size);

        for (index, line) in lines {
            let line = line?;
            let raw: RawRecord = serde_json::from_str(&line).map_err(|source| LoadError::Json {
                line: index + 1,
                source,
            })?;
            records.push(self.to_record(raw));
            progress.inc(1);
        }
        progress.finish_and_clear();

        if records.is_empty() {
            return Err(LoadError::EmptySource(self.raw_source.clone()));
        }

        sample_file::write_sample(&self.sample_path, &records)?;
        debug!("Sample persisted to {}", self.sample_path.display());

        Ok(records)
    }

    fn to_record(&self, raw: RawRecord) -> Record {
        Record {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            authors: raw.authors.unwrap_or_default(),
            categories: raw.categories.unwrap_or_default(),
            abstract_text: truncate_abstract(
                &raw.abstract_text.unwrap_or_default(),
                self.abstract_max_chars,
                &self.truncation_marker,
            ),
            update_date: raw.update_date.unwrap_or_default(),
            versions: raw
                .versions
                .map(|v| u32::try_from(v.len()).unwrap_or(u32::MAX))
                .unwrap_or(0),
        }
    }

    fn progress_bar(&self, sample_size: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(sample_size as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Reading lines [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

/// Keep the first `max_chars` characters and append the marker.
pub fn truncate_abstract(text: &str, max_chars: usize, marker: &str) -> String {
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(marker);
    truncated
}

/// Compute summary statistics over a sample table.
pub fn get_data_stats(records: &[Record], top_n: usize) -> DataStats {
    let frequencies = category_frequencies(records);
    let unique_categories = frequencies.len();
    let top_categories = frequencies.into_iter().take(top_n).collect();

    let mut dates = records.iter().filter_map(|r| {
        let parsed = r.parsed_date();
        if parsed.is_none() && !r.update_date.trim().is_empty() {
            debug!("Skipping unparseable date '{}' of {}", r.update_date, r.id);
        }
        parsed
    });
    let date_range = dates.next().map(|first| {
        dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)))
    });

    DataStats {
        total_records: records.len(),
        unique_categories,
        date_range,
        top_categories,
    }
}
