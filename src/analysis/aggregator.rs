//! Record aggregation and descriptive statistics.
//!
//! This module provides the pure computations behind the analysis
//! passes: category frequencies, per-year counts, and the length
//! distribution of abstracts.

use super::AnalysisError;
use crate::models::{CategoryCount, DataStats, LengthSummary, Record, YearCount};
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};

/// Count category tokens across all records.
///
/// Sorted by count (highest first); equal counts keep first-seen order.
pub fn category_frequencies(records: &[Record]) -> Vec<CategoryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for token in records.iter().flat_map(|r| r.category_tokens()) {
        match index.get(token) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(token, counts.len());
                counts.push(CategoryCount {
                    category: token.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort preserves first-seen order among ties
    counts.sort_by_key(|c| std::cmp::Reverse(c.count));
    counts
}

/// Get the `n` most frequent category tokens.
pub fn top_categories(records: &[Record], n: usize) -> Vec<CategoryCount> {
    let mut counts = category_frequencies(records);
    counts.truncate(n);
    counts
}

/// Count records per update year, ascending by year.
///
/// Records with an empty date are skipped; any other date that does not
/// parse is an error.
pub fn yearly_counts(records: &[Record]) -> Result<Vec<YearCount>, AnalysisError> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();

    for record in records {
        if record.update_date.trim().is_empty() {
            continue;
        }
        let date = record
            .parsed_date()
            .ok_or_else(|| AnalysisError::InvalidDate {
                id: record.id.clone(),
                value: record.update_date.clone(),
            })?;
        *years.entry(date.year()).or_default() += 1;
    }

    Ok(years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect())
}

/// Character length of every abstract, in table order.
pub fn abstract_lengths(records: &[Record]) -> Vec<usize> {
    records.iter().map(Record::abstract_len).collect()
}

/// Linear-interpolated quantile of sorted values (`q` in `[0, 1]`).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn sorted_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Describe a distribution: count, mean, sample std, min, quartiles, max.
pub fn describe(values: &[f64]) -> Result<LengthSummary, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let sorted = sorted_values(values);
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let variance =
            sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });

    Ok(LengthSummary {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// One equal-width histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Split values into `bins` equal-width bins spanning their range.
///
/// The last bin includes its upper edge. A zero-width range is widened
/// by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lower, upper) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (upper - lower) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lower + width * i as f64,
            upper: if i + 1 == bins {
                upper
            } else {
                lower + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in values {
        let i = (((value - lower) / width).floor() as usize).min(bins - 1);
        result[i].count += 1;
    }

    result
}

/// Box-and-whisker geometry of a distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest value within 1.5 IQR below `q1`.
    pub whisker_low: f64,
    /// Highest value within 1.5 IQR above `q3`.
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Compute box plot geometry. Returns `None` for empty input.
pub fn box_plot_stats(values: &[f64]) -> Option<BoxPlotStats> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted_values(values);
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let within: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| (low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxPlotStats {
        q1,
        median: quantile(&sorted, 0.5),
        q3,
        whisker_low: within.first().copied().unwrap_or(q1),
        whisker_high: within.last().copied().unwrap_or(q3),
        outliers: sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect(),
    })
}

/// Generate a text summary of dataset statistics.
pub fn stats_summary_text(stats: &DataStats) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Total papers: {}", stats.total_records));
    match stats.date_range {
        Some((min, max)) => lines.push(format!("Date range: {} to {}", min, max)),
        None => lines.push("Date range: unavailable".to_string()),
    }
    lines.push(format!("Unique categories: {}", stats.unique_categories));

    if !stats.top_categories.is_empty() {
        lines.push(String::new());
        lines.push(format!("Top {} categories:", stats.top_categories.len()));

        let width = stats
            .top_categories
            .iter()
            .map(|c| c.category.len())
            .max()
            .unwrap_or(0);
        for entry in &stats.top_categories {
            lines.push(format!(
                "  {:<width$}  {}",
                entry.category,
                entry.count,
                width = width
            ));
        }
    }

    lines.join("\n")
}
