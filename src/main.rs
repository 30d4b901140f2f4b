//! Parts-Spider main entry point
//!
//! This is the command-line interface for the vendor-catalog reconciliation
//! crawler.

use anyhow::Context as _;
use clap::Parser;
use parts_spider::config::{load_config_with_hash, parse_duration, CliOverrides, Config, RunSettings};
use parts_spider::crawler::Coordinator;
use parts_spider::output::print_statistics;
use parts_spider::VendorKey;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Parts-Spider: crawl a vendor catalog and reconcile it against a reference
///
/// Crawls one vendor's public site, extracts every product, and writes a
/// backtick-delimited report that marks each part New, Changed, Unchanged,
/// Discontinued or Not Found by Spider.
#[derive(Parser, Debug)]
#[command(name = "parts-spider")]
#[command(version)]
#[command(about = "Vendor-catalog reconciliation crawler", long_about = None)]
struct Cli {
    /// Vendor to crawl
    #[arg(long, value_enum)]
    target: VendorKey,

    /// Start URL, replacing the vendor's seed
    #[arg(long)]
    seed: Option<String>,

    /// Report file to write
    #[arg(long)]
    out: Option<PathBuf>,

    /// Reference catalog file (CSV or tab-separated)
    #[arg(long)]
    spreadsheet: Option<PathBuf>,

    /// Process the seed page only
    #[arg(long)]
    single: bool,

    /// Strip the query string from every crawled URL
    #[arg(long = "stripsku")]
    strip_sku: bool,

    /// Run without a reference catalog; every product is New
    #[arg(long = "skipcatalog")]
    skip_catalog: bool,

    /// Stop after this long, finishing in-flight pages (e.g. 90s, 5m)
    #[arg(long = "stopafter", value_parser = duration_arg)]
    stop_after: Option<Duration>,

    /// Cancel after this long, aborting in-flight pages
    #[arg(long = "cancelafter", value_parser = duration_arg)]
    cancel_after: Option<Duration>,

    /// Stop when this URL comes up for fetching
    #[arg(long = "stopat")]
    stop_at: Option<String>,

    /// Cancel when this URL comes up for fetching
    #[arg(long = "cancelat")]
    cancel_at: Option<String>,

    /// Log memory and queue statistics at this interval
    #[arg(long, value_parser = duration_arg)]
    memstats: Option<Duration>,

    /// Path to an optional TOML run file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Print the resolved settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            seed: self.seed.clone(),
            out: self.out.clone(),
            spreadsheet: self.spreadsheet.clone(),
            single: self.single,
            strip_sku: self.strip_sku,
            skip_catalog: self.skip_catalog,
            stop_after: self.stop_after,
            cancel_after: self.cancel_after,
            stop_at: self.stop_at.clone(),
            cancel_at: self.cancel_at.clone(),
            memstats: self.memstats,
        }
    }
}

fn duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let settings = RunSettings::resolve(cli.target, &config, &cli.overrides())
        .context("Invalid run settings")?;

    if cli.dry_run {
        handle_dry_run(&config, &settings);
        return Ok(());
    }

    handle_crawl(config, settings).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("parts_spider=info,warn"),
            1 => EnvFilter::new("parts_spider=debug,info"),
            2 => EnvFilter::new("parts_spider=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, settings: &RunSettings) {
    println!("=== Parts-Spider Dry Run ===\n");

    println!("{}", settings);

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Worker idle TTL: {}s", config.crawler.worker_idle_ttl_secs);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, settings: RunSettings) -> anyhow::Result<()> {
    let output = settings.output_path.clone();
    let coordinator = Coordinator::new(config, settings)
        .with_context(|| format!("Failed to open report {}", output.display()))?;

    let stats = coordinator.run().await.context("Crawl failed")?;
    print_statistics(&stats);
    tracing::info!("Report written to {}", output.display());
    Ok(())
}
