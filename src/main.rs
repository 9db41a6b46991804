//! PaperStats - exploratory statistics for arXiv metadata
//!
//! A CLI tool that samples the arXiv metadata snapshot, prints dataset
//! statistics, and renders category, timeline, and abstract-length charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable sample, invalid data, chart failure, etc.)

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use analysis::analyzer::{ABSTRACTS_CHART, CATEGORIES_CHART, TIMELINE_CHART};
use analysis::PublicationAnalyzer;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use loader::DataLoader;
use models::Sample;
use report::{PlottersRenderer, RunMetadata, RunReport};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

const RULE_WIDTH: usize = 60;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // --init-config writes a file and exits before logging starts
    if args.init_config {
        return handle_init_config();
    }

    // Resolved before logging: `[general] verbose` picks the level
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(args.quiet));

    info!("PaperStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run_analysis(args, config) {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .paperstats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize paths, sample size, and chart colors.");
    Ok(())
}

/// Install the compact subscriber at the resolved level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// Run the load → stats → analyze sequence.
fn run_analysis(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    println!("📚 SCIENTIFIC PUBLICATIONS ANALYSIS");
    println!("{}", "=".repeat(RULE_WIDTH));

    // Step 1: Load the sample
    println!("\n📥 Step 1: Loading data...");
    let loader = DataLoader::from_config(&config).with_progress(!args.quiet);
    let sample = load_sample(&loader, &args, &config)?;
    println!("   {} records from {}", sample.len(), sample.origin);

    // Step 2: Dataset statistics
    println!("\n📊 Step 2: Data statistics...");
    let stats = loader::get_data_stats(&sample.records, config.sampling.top_n);
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", analysis::stats_summary_text(&stats));
    println!("{}", "=".repeat(RULE_WIDTH));

    // Step 3: Analysis passes
    println!("\n🔬 Step 3: Running analysis...");
    let analyzer = PublicationAnalyzer::from_config(PlottersRenderer, &config)
        .context("Invalid chart configuration")?;

    println!("\n   Analyzing research categories...");
    let top_categories = analyzer
        .analyze_categories(&sample.records)
        .context("Category analysis failed")?;

    println!("   Analyzing publication timeline...");
    let timeline = analyzer
        .analyze_timeline(&sample.records)
        .context("Timeline analysis failed")?;

    println!("   Analyzing paper abstracts...");
    let abstracts = analyzer
        .analyze_abstracts(&sample.records)
        .context("Abstract analysis failed")?;
    println!(
        "   Average abstract length: {:.0} characters",
        abstracts.mean
    );
    println!("   Longest abstract: {:.0} characters", abstracts.max);
    println!("   Shortest abstract: {:.0} characters", abstracts.min);

    let charts = vec![
        analyzer.chart_path(CATEGORIES_CHART),
        analyzer.chart_path(TIMELINE_CHART),
        analyzer.chart_path(ABSTRACTS_CHART),
    ];

    // Step 4: Optional run report
    if let Some(ref report_path) = args.report {
        let run_report = RunReport {
            metadata: RunMetadata {
                generated_at: Utc::now(),
                origin: sample.origin.clone(),
                sample_path: loader.sample_path().to_path_buf(),
                duration_seconds: start_time.elapsed().as_secs_f64(),
            },
            stats: stats.clone(),
            top_categories,
            timeline,
            abstracts,
            charts: charts.clone(),
        };

        let output = match args.format {
            OutputFormat::Json => report::generate_json_report(&run_report)?,
            OutputFormat::Markdown => report::generate_markdown_report(&run_report),
        };
        std::fs::write(report_path, &output)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        info!("Report saved to {}", report_path.display());
    }

    // Summary of produced artifacts
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("✅ ANALYSIS COMPLETED SUCCESSFULLY!");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("📁 Generated Files:");
    println!("   - {}", loader.sample_path().display());
    for chart in &charts {
        println!("   - {}", chart.display());
    }
    if let Some(ref report_path) = args.report {
        println!("   - {}", report_path.display());
    }
    println!("📚 Papers analyzed: {}", stats.total_records);
    println!("🔬 Unique categories: {}", stats.unique_categories);
    println!("⏱️  Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Build the sample: read back the persisted table or sample the raw source.
fn load_sample(loader: &DataLoader, args: &Args, config: &Config) -> Result<Sample> {
    if args.from_sample {
        info!("Reading persisted sample from {}", loader.sample_path().display());
        let sample = loader.load_sample().with_context(|| {
            format!(
                "Failed to read sample table {}",
                loader.sample_path().display()
            )
        })?;
        if sample.is_empty() {
            anyhow::bail!(
                "Sample table {} has no records",
                loader.sample_path().display()
            );
        }
        return Ok(sample);
    }

    let sample = loader.create_sample(config.sampling.sample_size);
    if sample.origin.is_demo() {
        println!("   ⚠️  Using demo data: {}", sample.origin);
    }
    Ok(sample)
}

/// Load the config file and apply the command-line overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

/// `--config` first, then `.paperstats.toml`, then built-in defaults.
///
/// Runs before the subscriber is installed, so problems go to stderr.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("Warning: ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
