//! Command-line interface components.

use crate::config::EnrichmentConfig;
use crate::enrichment::data_enrichment;
use crate::lookup::{FileLookupStore, read_table, write_table};
use crate::models::EnrichmentStats;
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "survey-enrichment")]
#[command(about = "Enrich survey responses from lookup tables and report data-quality anomalies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Survey responses to enrich (.json, .csv or .parquet)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON enrichment configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Directory holding the lookup tables (defaults to the configuration's directory)
    #[arg(short, long, value_name = "DIR")]
    pub lookups: Option<PathBuf>,

    /// Where to write the enriched dataset; the extension selects the format
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Where to write the anomaly report; the extension selects the format
    #[arg(short, long, value_name = "FILE")]
    pub anomalies: Option<PathBuf>,

    /// Skip the marine mismatch check regardless of configuration
    #[arg(long)]
    pub no_marine_check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Lookup directory, defaulting to the directory of the configuration file
    pub fn get_lookup_dir(&self) -> PathBuf {
        match &self.lookups {
            Some(dir) => dir.clone(),
            None => self
                .config
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Enriched output path, defaulting to `<input>_enriched.json` beside the input
    pub fn get_output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.input, "enriched"))
    }

    /// Anomaly report path, defaulting to `<input>_anomalies.json` beside the input
    pub fn get_anomalies_path(&self) -> PathBuf {
        self.anomalies
            .clone()
            .unwrap_or_else(|| sibling_path(&self.input, "anomalies"))
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    input.with_file_name(format!("{}_{}.json", stem, suffix))
}

/// Outcome of one command-line run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: EnrichmentStats,
    pub enriched_path: PathBuf,
    pub anomalies_path: PathBuf,
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("survey_enrichment={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", level);
}

/// Load inputs, enrich, and write both outputs
pub fn run(args: &Args) -> Result<RunReport> {
    let mut config = EnrichmentConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    if args.no_marine_check {
        config.marine_mismatch_check = false;
    }

    let dataset = read_table(&args.input)
        .with_context(|| format!("Failed to read input {}", args.input.display()))?;

    let store = FileLookupStore::new(args.get_lookup_dir());
    let mut output = data_enrichment(&dataset, &config, &store).context("Enrichment failed")?;

    let enriched_path = args.get_output_path();
    let anomalies_path = args.get_anomalies_path();
    write_table(&mut output.enriched, &enriched_path)
        .with_context(|| format!("Failed to write {}", enriched_path.display()))?;
    write_table(&mut output.anomalies, &anomalies_path)
        .with_context(|| format!("Failed to write {}", anomalies_path.display()))?;

    Ok(RunReport {
        stats: output.stats,
        enriched_path,
        anomalies_path,
    })
}

/// Print a human-readable summary to stdout
pub fn print_summary(report: &RunReport) {
    let stats = &report.stats;

    println!("{}", "Enrichment complete".bright_green().bold());
    println!(
        "  {} {}",
        "Rows:".bright_white(),
        stats.enriched_rows.to_string().bright_cyan()
    );
    println!(
        "  {} {}",
        "Lookups applied:".bright_white(),
        stats.lookups_applied.to_string().bright_cyan()
    );

    let total = stats.total_anomalies();
    let anomalies = format!(
        "{} ({} missing values, {} marine mismatches)",
        total, stats.missing_value_anomalies, stats.marine_mismatch_anomalies
    );
    if total == 0 {
        println!("  {} {}", "Anomalies:".bright_white(), anomalies.bright_green());
    } else {
        println!("  {} {}", "Anomalies:".bright_white(), anomalies.bright_yellow());
    }

    if !stats.row_count_preserved() {
        println!(
            "  {} row count changed from {} to {}",
            "Warning:".bright_yellow().bold(),
            stats.input_rows,
            stats.enriched_rows
        );
    }

    println!(
        "  {} {}",
        "Enriched:".bright_white(),
        report.enriched_path.display().to_string().bright_black()
    );
    println!(
        "  {} {}",
        "Anomalies file:".bright_white(),
        report.anomalies_path.display().to_string().bright_black()
    );
    println!(
        "  {} {}ms",
        "Time:".bright_white(),
        stats.processing_time_ms
    );
}
