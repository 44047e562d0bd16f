//! Sitemap-Sweep main entry point
//!
//! Command-line interface for flattening a website's sitemap tree into a
//! list of page locations.

use anyhow::Context;
use clap::Parser;
use sitemap_sweep::config::{load_config, CrawlConfig, FieldSelection, SitemapField};
use sitemap_sweep::crawler::{parse_lastmod, Crawler};
use sitemap_sweep::outcome::Site;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemap-Sweep: fetch and flatten a website's sitemap tree
///
/// Given a root sitemap URL, Sitemap-Sweep recursively follows nested
/// sitemap indexes and prints every page location found, one per line.
/// Unreachable branches are reported on stderr; reachable ones still print.
#[derive(Parser, Debug)]
#[command(name = "sitemap-sweep")]
#[command(version)]
#[command(about = "Fetch and flatten a website's sitemap tree", long_about = None)]
struct Cli {
    /// Root sitemap URL (e.g. https://example.com/sitemap.xml)
    #[arg(value_name = "URL", required_unless_present = "config")]
    url: Option<String>,

    /// Path to a TOML configuration file providing defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Maximum concurrent sitemap fetches
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Retry attempts per sitemap before giving up on a branch
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Drop entries last modified before this instant (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "WHEN")]
    lastmod: Option<String>,

    /// Extra request header as NAME:VALUE, may be repeated
    #[arg(long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Skip TLS certificate validation
    #[arg(long)]
    insecure: bool,

    /// Print named fields as JSON records instead of bare locations
    /// (loc, lastmod, changefreq, priority), may be repeated
    #[arg(long = "field", value_name = "FIELD")]
    fields: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let url = cli
        .url
        .clone()
        .or_else(|| config.url.clone())
        .context("no sitemap URL given (pass one as an argument or set 'url' in the config file)")?;

    let crawler = Crawler::new(config)?;
    let report = crawler.flatten(&url).await;

    for site in &report.sites {
        match site {
            Site::Url(loc) => println!("{}", loc),
            Site::Fields(record) => println!("{}", serde_json::to_string(record)?),
        }
    }

    for error in &report.errors {
        tracing::warn!(
            "{}: {} [{}, {} retries]",
            error.url,
            error.message,
            error.kind,
            error.retries
        );
    }

    if report.sites.is_empty() && !report.errors.is_empty() {
        anyhow::bail!(
            "crawl of {} produced no sites ({} branches failed)",
            report.url,
            report.errors.len()
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that the extracted site list on stdout stays clean
/// for piping.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_sweep=info,warn"),
            1 => EnvFilter::new("sitemap_sweep=debug,info"),
            2 => EnvFilter::new("sitemap_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the crawl configuration: config file first, flags override
fn resolve_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?
        }
        None => CrawlConfig::default(),
    };

    if let Some(timeout) = cli.timeout {
        config.timeout_ms = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(retries) = cli.retries {
        config.retries = retries;
    }
    if let Some(lastmod) = &cli.lastmod {
        let threshold = parse_lastmod(lastmod)
            .with_context(|| format!("cannot parse --lastmod value '{}'", lastmod))?;
        config.lastmod = Some(threshold);
    }
    if cli.insecure {
        config.verify_tls = false;
    }

    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("header '{}' is not in NAME:VALUE form", header))?;
        config
            .request_headers
            .insert(name.trim().to_string(), value.trim().to_string());
    }

    if !cli.fields.is_empty() {
        let mut selection = FieldSelection::new();
        for name in &cli.fields {
            let field = SitemapField::from_name(name).with_context(|| {
                format!("unknown field '{}' (expected loc, lastmod, changefreq, or priority)", name)
            })?;
            selection.insert(field);
        }
        config.fields = Some(selection);
    }

    Ok(config)
}
