//! Crawler module for sitemap fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeout cancellation and gzip payload handling
//! - Sitemap XML parsing (urlset and sitemapindex documents)
//! - Recursive, concurrency-bounded tree traversal with per-branch retries

mod engine;
mod fetcher;
mod parser;

pub use engine::Crawler;
pub use fetcher::{build_http_client, FetchFailure, Fetcher};
pub use parser::{parse_document, parse_lastmod, Document, UrlEntry};

use crate::config::CrawlConfig;
use crate::outcome::SitemapReport;
use crate::SweepError;

/// Crawls and flattens the sitemap tree rooted at `url`
///
/// Convenience wrapper around [`Crawler`] for one-shot use. Only setup can
/// fail; the crawl itself always resolves to a report.
///
/// # Arguments
///
/// * `url` - The root sitemap URL (e.g. `https://example.com/sitemap.xml`)
/// * `config` - Crawl parameters (timeout, concurrency, retries, filters)
///
/// # Returns
///
/// * `Ok(SitemapReport)` - Sites and per-branch errors, tagged with `url`
/// * `Err(SweepError)` - Invalid configuration or client build failure
pub async fn flatten(url: &str, config: CrawlConfig) -> Result<SitemapReport, SweepError> {
    Ok(Crawler::new(config)?.flatten(url).await)
}
