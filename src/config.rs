//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.paperstats.toml` files.

use anyhow::{Context, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".paperstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Sampling settings.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Chart rendering settings.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Raw JSON Lines metadata snapshot.
    #[serde(default = "default_raw_source")]
    pub raw_source: PathBuf,

    /// Persisted sample table (CSV).
    #[serde(default = "default_sample_path")]
    pub sample_path: PathBuf,

    /// Directory receiving the chart images.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_source: default_raw_source(),
            sample_path: default_sample_path(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_raw_source() -> PathBuf {
    PathBuf::from("data/raw/arxiv-metadata-oai-snapshot.json")
}

fn default_sample_path() -> PathBuf {
    PathBuf::from("data/sample/sample_data.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Maximum number of source lines to ingest.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Abstracts from the raw source are cut to this many characters.
    #[serde(default = "default_abstract_max_chars")]
    pub abstract_max_chars: usize,

    /// Appended to every abstract taken from the raw source.
    #[serde(default = "default_truncation_marker")]
    pub truncation_marker: String,

    /// Number of categories reported in rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            abstract_max_chars: default_abstract_max_chars(),
            truncation_marker: default_truncation_marker(),
            top_n: default_top_n(),
        }
    }
}

fn default_sample_size() -> usize {
    1000
}

fn default_abstract_max_chars() -> usize {
    200
}

fn default_truncation_marker() -> String {
    "...".to_string()
}

fn default_top_n() -> usize {
    10
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Output resolution in dots per inch.
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Number of histogram bins for abstract lengths.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Bar color of the category chart (`#RRGGBB`).
    #[serde(default = "default_bar_color")]
    pub bar_color: String,

    /// Line color of the timeline chart (`#RRGGBB`).
    #[serde(default = "default_line_color")]
    pub line_color: String,

    /// Fill color of the abstract histogram (`#RRGGBB`).
    #[serde(default = "default_histogram_color")]
    pub histogram_color: String,

    /// Stroke color of the box plot (`#RRGGBB`).
    #[serde(default = "default_box_color")]
    pub box_color: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            histogram_bins: default_histogram_bins(),
            bar_color: default_bar_color(),
            line_color: default_line_color(),
            histogram_color: default_histogram_color(),
            box_color: default_box_color(),
        }
    }
}

fn default_dpi() -> u32 {
    300
}

fn default_histogram_bins() -> usize {
    20
}

fn default_bar_color() -> String {
    "#F08080".to_string() // lightcoral
}

fn default_line_color() -> String {
    "#1F77B4".to_string()
}

fn default_histogram_color() -> String {
    "#90EE90".to_string() // lightgreen
}

fn default_box_color() -> String {
    "#1F77B4".to_string()
}

/// Parse a `#RRGGBB` hex string into a color.
pub fn parse_hex_color(value: &str) -> Option<RGBColor> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values that serde alone cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.sampling.sample_size == 0 {
            anyhow::bail!("sampling.sample_size must be at least 1");
        }
        if self.charts.dpi == 0 {
            anyhow::bail!("charts.dpi must be at least 1");
        }
        if self.charts.histogram_bins == 0 {
            anyhow::bail!("charts.histogram_bins must be at least 1");
        }

        let colors = [
            ("charts.bar_color", &self.charts.bar_color),
            ("charts.line_color", &self.charts.line_color),
            ("charts.histogram_color", &self.charts.histogram_color),
            ("charts.box_color", &self.charts.box_color),
        ];
        for (key, value) in colors {
            if parse_hex_color(value).is_none() {
                anyhow::bail!("{} must be a #RRGGBB color, got '{}'", key, value);
            }
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(sample_size) = args.sample_size {
            self.sampling.sample_size = sample_size;
        }
        if let Some(ref raw_source) = args.raw_source {
            self.paths.raw_source = raw_source.clone();
        }
        if let Some(ref sample_path) = args.sample_path {
            self.paths.sample_path = sample_path.clone();
        }
        if let Some(ref output_dir) = args.output_dir {
            self.paths.output_dir = output_dir.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Maximum tracing level: `quiet` wins, then `general.verbose`.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampling.sample_size, 1000);
        assert_eq!(config.sampling.abstract_max_chars, 200);
        assert_eq!(config.sampling.truncation_marker, "...");
        assert_eq!(config.charts.histogram_bins, 20);
        assert_eq!(
            config.paths.sample_path,
            PathBuf::from("data/sample/sample_data.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r##"
[paths]
raw_source = "input/snapshot.jsonl"

[sampling]
sample_size = 50

[charts]
dpi = 96
bar_color = "#112233"
"##;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.paths.raw_source, PathBuf::from("input/snapshot.jsonl"));
        assert_eq!(config.paths.output_dir, PathBuf::from("."));
        assert_eq!(config.sampling.sample_size, 50);
        assert_eq!(config.sampling.top_n, 10);
        assert_eq!(config.charts.dpi, 96);
        assert_eq!(config.charts.bar_color, "#112233");
    }

    #[test]
    fn test_validate_rejects_bad_color() {
        let mut config = Config::default();
        config.charts.line_color = "blue".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        let color = parse_hex_color("#F08080").unwrap();
        assert_eq!((color.0, color.1, color.2), (0xF0, 0x80, 0x80));
        assert!(parse_hex_color("F08080").is_none());
        assert!(parse_hex_color("#F0808").is_none());
        assert!(parse_hex_color("#GG8080").is_none());
    }

    #[test]
    fn test_verbose_setting_drives_log_level() {
        let config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        assert_eq!(config.log_level(false), tracing::Level::DEBUG);
        assert_eq!(config.log_level(true), tracing::Level::ERROR);
        assert_eq!(Config::default().log_level(false), tracing::Level::INFO);
    }

    #[test]
    fn test_verbose_flag_merges_into_config() {
        let args = crate::cli::Args::try_parse_from(["paperstats", "--verbose"]).unwrap();
        let mut config = Config::default();
        config.merge_with_args(&args);
        assert!(config.general.verbose);
        assert_eq!(config.log_level(args.quiet), tracing::Level::DEBUG);

        let args = crate::cli::Args::try_parse_from(["paperstats", "-n", "5"]).unwrap();
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        config.merge_with_args(&args);
        assert!(config.general.verbose);
        assert_eq!(config.sampling.sample_size, 5);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[sampling]"));
        assert!(toml_str.contains("[charts]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.sampling.sample_size, 1000);
    }
}
