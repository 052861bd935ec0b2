//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror archive crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use sumi_mirror::config::{load_config_with_hash, Config};
use sumi_mirror::crawler::{run_crawl, CrawlOutcome};
use sumi_mirror::storage::{CheckpointStore, JsonCheckpointStore};
use sumi_mirror::Frontier;
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: a resumable archive mirror
///
/// Sumi-Mirror walks a document archive's folder listings, recreates the
/// folder tree locally, and downloads every asset into place. Progress is
/// checkpointed so an interrupted crawl resumes where it stopped.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A resumable archive mirror", long_about = None)]
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

    /// Resume from the checkpoint if one exists (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Discard any checkpoint and start from the seed URL
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show the saved checkpoint and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.status {
        handle_status(&config)
    } else {
        handle_crawl(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Sumi-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Destination: {}", config.crawler.destination.display());
    println!("  Traversal: {:?}", config.crawler.traversal);
    println!(
        "  Checkpoint every: {} tasks",
        config.crawler.checkpoint_interval
    );
    println!("  Download delay: {}ms", config.crawler.download_delay);
    println!("  Asset extension: .{}", config.crawler.asset_extension);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Download timeout: {}s", config.crawler.download_timeout);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nCheckpoint:");
    println!("  Queue: {}", config.checkpoint.queue_path.display());
    println!("  Seen: {}", config.checkpoint.seen_path.display());

    println!("\nClassifier:");
    println!("  Folder markers: {:?}", config.classifier.container_markers);
    println!("  Asset markers: {:?}", config.classifier.asset_markers);
    println!(
        "  Child items: {} > {}",
        config.classifier.child_block_selector, config.classifier.child_link_selector
    );
    println!("  Pagination: {}", config.classifier.pagination_selector);
    println!("  Download: {}", config.classifier.download_selector);

    let store = JsonCheckpointStore::from_config(&config.checkpoint);
    println!("\n✓ Configuration is valid");
    if store.exists() {
        println!("✓ Would resume from {}", store.queue_path().display());
    } else {
        println!("✓ Would start from {}", config.crawler.seed_url);
    }

    Ok(())
}

/// Handles the --status mode: shows the saved checkpoint
fn handle_status(config: &Config) -> anyhow::Result<()> {
    let store = JsonCheckpointStore::from_config(&config.checkpoint);

    let snapshot = store
        .load()
        .with_context(|| format!("failed to read {}", store.queue_path().display()))?;

    let Some(snapshot) = snapshot else {
        println!("No checkpoint at {}", store.queue_path().display());
        return Ok(());
    };

    let frontier = Frontier::from_snapshot(config.crawler.traversal, snapshot);

    println!("=== Checkpoint Status ===\n");
    println!("  Pending tasks: {}", frontier.len());
    println!("  Seen URLs: {}", frontier.seen_count());

    if !frontier.is_empty() {
        println!("\nNext up:");
        for task in frontier.pending().take(10) {
            println!("  {} <- {}", task.path.display(), task.url);
        }
        if frontier.len() > 10 {
            println!("  ... and {} more", frontier.len() - 10);
        }
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
    } else {
        tracing::info!("Starting crawl (will resume if a checkpoint exists)");
    }

    tracing::info!(
        "Mirroring {} into {}",
        config.crawler.seed_url,
        config.crawler.destination.display()
    );

    match run_crawl(config, fresh).await.context("crawl failed")? {
        CrawlOutcome::Completed => tracing::info!("Crawl completed successfully"),
        CrawlOutcome::Interrupted => tracing::info!("Crawl interrupted; state saved"),
    }

    Ok(())
}
