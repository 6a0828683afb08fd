//! tcrun - scripted test-case runner for tricache

mod config;
mod report;
mod runner;
mod script;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tricache::TriCache;

use crate::config::RunConfig;
use crate::report::{ConsoleSink, FileSink, TeeSink};
use crate::runner::Runner;
use crate::script::Script;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run configuration file
    #[arg(short, long, default_value = "tricache_config.json")]
    config: PathBuf,

    /// Test-case file (overrides the config's inputFile)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report file (overrides the config's outputFile)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Recency list size
    #[arg(long)]
    capacity: Option<usize>,

    /// Hash table size
    #[arg(long)]
    buckets: Option<usize>,

    /// Don't echo the report to stdout
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.input {
        Some(input) if !args.config.exists() => RunConfig::for_input(input),
        _ => RunConfig::load(&args.config)?,
    };
    if let Some(input) = args.input {
        config.input_file = input;
    }
    if let Some(output) = args.output {
        config.output_file = Some(output);
    }
    if let Some(capacity) = args.capacity {
        config.fifo_list_size = capacity;
    }
    if let Some(buckets) = args.buckets {
        config.hash_table_size = buckets;
    }

    init_tracing(&config)?;

    info!("Starting tcrun v{}", env!("CARGO_PKG_VERSION"));
    info!("Test cases: {}", config.input_file.display());
    info!(
        "Recency list size: {}, hash table size: {}",
        config.fifo_list_size, config.hash_table_size
    );

    let script = Script::load(&config.input_file)?;
    info!(
        "Loaded {} test cases ({} operations)",
        script.test_cases.len(),
        script.operation_count()
    );
    let cache = TriCache::with_config(&config.cache_config()).context("Invalid cache settings")?;

    let mut sink = TeeSink::new();
    if !args.quiet {
        sink = sink.with(ConsoleSink);
    }
    if let Some(output) = &config.output_file {
        sink = sink.with(FileSink::create(output)?);
    }

    if sink.is_empty() {
        warn!("Report has no destination; pass --output or drop --quiet");
    }

    let mut runner = Runner::new(cache, sink);
    info!("Effective cache capacity: {}", runner.cache().capacity());
    runner.log(&format!(
        "tricache test run {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ))?;
    let summary = runner.run(&script)?;

    info!(
        "Ran {} test cases ({} operations)",
        summary.test_cases, summary.operations
    );
    info!("Cache activity: {}", summary.stats);

    Ok(())
}

fn init_tracing(config: &RunConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match &config.error_log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open error log {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
