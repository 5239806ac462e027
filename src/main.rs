//! Gleaner main entry point
//!
//! Command-line interface for the gleaner scraping pipeline.

use clap::Parser;
use gleaner::config::{load_config, select_sources};
use gleaner::pipeline::{exit_code, run_pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gleaner: a polite source-scraping pipeline
///
/// Fetches the configured sources while respecting robots.txt and per-host
/// rate limits, and appends normalized records and run metrics to the
/// output directory as JSONL.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "A polite source-scraping pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Comma-separated source names to run (default: all)
    #[arg(long, value_name = "NAMES")]
    sources: Option<String>,

    /// Also run sources marked disabled in the configuration
    #[arg(long)]
    include_disabled: bool,

    /// Also run nonreputable sources
    #[arg(long)]
    allow_unverified: bool,

    /// List the selected sources and exit
    #[arg(long)]
    list_sources: bool,

    /// Run every fetch and parse but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Override the configured output directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = load_config(&cli.config)?;

    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }

    let only = split_csv(cli.sources.as_deref());
    let selected = select_sources(
        &config.sources,
        &only,
        cli.include_disabled,
        cli.allow_unverified,
    );

    if cli.list_sources {
        for source in &selected {
            println!("{}", source.name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if selected.is_empty() {
        eprintln!("No sources selected. Enable sources in the config or pass --include-disabled.");
        return Ok(ExitCode::FAILURE);
    }

    let metrics = run_pipeline(&config, &selected, cli.dry_run).await?;
    Ok(ExitCode::from(exit_code(&metrics)))
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Splits a comma-separated list, dropping empty items
fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
