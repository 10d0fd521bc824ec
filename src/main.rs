//! DepthCrawl main entry point
//!
//! This is the command-line interface for the depth-bounded crawler.

use anyhow::Context;
use clap::Parser;
use depthcrawl::config::{load_config_with_hash, Config};
use depthcrawl::crawler::run_crawl;
use depthcrawl::output::{print_statistics, write_markdown_report, CrawlStatistics, ReportInfo};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// DepthCrawl: a depth-bounded, host-throttled web crawler
///
/// Crawls from a seed URL down to a maximum depth, limiting concurrent
/// downloads overall and per host, and reports every page that failed.
#[derive(Parser, Debug)]
#[command(name = "depthcrawl")]
#[command(version)]
#[command(about = "A depth-bounded, host-throttled web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Override the configured maximum depth
    #[arg(short, long, value_name = "N")]
    depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "report")]
    dry_run: bool,

    /// Write a markdown report of the crawl to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(depth) = cli.depth {
        anyhow::ensure!(depth >= 1, "--depth must be >= 1, got {}", depth);
        config.crawler.max_depth = depth;
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli.seed);
        return Ok(());
    }

    handle_crawl(&config, &cli, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depthcrawl=info,warn"),
            1 => EnvFilter::new("depthcrawl=debug,info"),
            2 => EnvFilter::new("depthcrawl=trace,debug"),
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

/// Handles the --dry-run mode: shows the crawl that would run
fn handle_dry_run(config: &Config, seed: &str) {
    println!("=== DepthCrawl Dry Run ===\n");

    println!("Seed: {}", seed);
    match depthcrawl::get_host(seed) {
        Ok(host) => println!("  Host: {}", host),
        Err(e) => println!("  ✗ {}", e),
    }

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Downloaders: {}", config.crawler.downloaders);
    println!("  Extractors: {}", config.crawler.extractors);
    println!("  Per host: {}", config.crawler.per_host);

    println!("\nUser Agent:");
    println!(
        "  {}",
        depthcrawl::crawler::format_user_agent(&config.user_agent)
    );

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!("  Max redirects: {}", config.http.max_redirects);
    println!("  HTTPS only: {}", config.http.https_only);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, cli: &Cli, config_hash: String) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let result = run_crawl(config, &cli.seed)
        .await
        .with_context(|| format!("crawl of {} failed", cli.seed))?;

    for (url, error) in &result.errors {
        tracing::debug!("{}: {}", url, error);
    }

    if !cli.quiet {
        print_statistics(&CrawlStatistics::from_result(&result));
    }

    if let Some(path) = &cli.report {
        let info = ReportInfo {
            seed: cli.seed.clone(),
            max_depth: config.crawler.max_depth,
            elapsed: start_time.elapsed(),
            config_hash: Some(config_hash),
        };
        write_markdown_report(&info, &result, path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}
