//! Crawl engine - recursive sitemap traversal
//!
//! This module contains the core crawl algorithm:
//! - Per-node fetch with immediate retries up to the configured budget
//! - Leaf urlsets filtered and projected into sites
//! - Index fan-out under one semaphore shared by the whole crawl tree
//! - Listing-order merge of child outcomes, whatever their completion order
//! - Conversion of every failure into a per-branch [`CrawlError`]
//!
//! A failing branch never aborts its siblings, and nothing escapes
//! [`Crawler::flatten`] as an error value.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::parser::Document;
use crate::outcome::{site, CrawlError, CrawlOutcome, ErrorKind, SitemapReport};
use crate::SweepError;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Everything a recursive call needs, cheap to clone into child tasks
#[derive(Clone)]
struct CrawlContext {
    config: Arc<CrawlConfig>,
    fetcher: Arc<Fetcher>,
    limiter: Arc<Semaphore>,
}

/// Chain of index locations from the root down to the current branch
///
/// Each branch owns its own view of the chain; sibling branches never
/// observe each other's ancestry, so duplicate locations across branches
/// are crawled normally while true cycles are cut.
enum Lineage {
    Root,
    Node { loc: String, parent: Arc<Lineage> },
}

impl Lineage {
    fn contains(&self, url: &str) -> bool {
        let mut current = self;
        loop {
            match current {
                Lineage::Root => return false,
                Lineage::Node { loc, parent } => {
                    if loc == url {
                        return true;
                    }
                    current = parent;
                }
            }
        }
    }
}

/// The sitemap crawler
///
/// Construction validates the configuration and builds the HTTP client;
/// after that, [`Crawler::flatten`] can be called any number of times and
/// never fails. Unreachable branches surface as report errors instead.
pub struct Crawler {
    config: Arc<CrawlConfig>,
    fetcher: Arc<Fetcher>,
}

impl Crawler {
    /// Creates a crawler for the given configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Crawl parameters, validated here
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(SweepError)` - Invalid configuration or client build failure
    pub fn new(config: CrawlConfig) -> Result<Self, SweepError> {
        crate::config::validate(&config)?;
        let client = build_http_client(&config)?;
        let fetcher = Fetcher::new(client, Duration::from_millis(config.timeout_ms));

        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        })
    }

    /// Crawls the sitemap tree rooted at `url` and flattens it
    ///
    /// One concurrency limiter is created per call and shared by every
    /// branch of the tree. The returned report is tagged with the requested
    /// URL; partial success is normal, with reachable branches contributing
    /// sites and unreachable ones contributing errors.
    pub async fn flatten(&self, url: &str) -> SitemapReport {
        if let Some(min) = &self.config.lastmod {
            tracing::debug!("using minimum lastmod threshold {}", min);
        }

        let root = url.to_string();
        let ctx = CrawlContext {
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            limiter: Arc::new(Semaphore::new(self.config.concurrency)),
        };

        // The root runs as its own task so that even a panic somewhere in
        // the tree still resolves to a well-formed report.
        let task = tokio::spawn(crawl_node(ctx, root.clone(), 0, Arc::new(Lineage::Root)));
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!("crawl of {} failed outright: {}", root, error);
                CrawlOutcome::from_error(CrawlError {
                    url: root.clone(),
                    kind: ErrorKind::Internal,
                    message: format!("crawl task failed: {}", error),
                    retries: 0,
                })
            }
        };

        tracing::info!(
            "crawl of {} finished: {} sites, {} errors",
            root,
            outcome.sites.len(),
            outcome.errors.len()
        );

        SitemapReport {
            url: root,
            sites: outcome.sites,
            errors: outcome.errors,
        }
    }
}

/// Crawls one node of the sitemap tree
///
/// Boxed because the future recurses through itself for retries and through
/// [`crawl_children`] for index fan-out.
fn crawl_node(
    ctx: CrawlContext,
    url: String,
    retry_index: u32,
    lineage: Arc<Lineage>,
) -> BoxFuture<'static, CrawlOutcome> {
    Box::pin(async move {
        let fetched = {
            // The permit covers exactly one fetch and is released before any
            // recursion, so a parent awaiting children holds no permit.
            let permit = match ctx.limiter.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(error) => {
                    return CrawlOutcome::from_error(CrawlError {
                        url,
                        kind: ErrorKind::Internal,
                        message: format!("concurrency limiter closed: {}", error),
                        retries: retry_index,
                    });
                }
            };
            let result = ctx.fetcher.fetch(&url).await;
            drop(permit);
            result
        };

        match fetched {
            Err(failure) => {
                if retry_index < ctx.config.retries {
                    tracing::debug!(
                        "retry attempt {} / {} for {} after {}",
                        retry_index + 1,
                        ctx.config.retries,
                        url,
                        failure.kind
                    );
                    return crawl_node(ctx, url, retry_index + 1, lineage).await;
                }

                tracing::warn!(
                    "giving up on {} after {} retries: {}",
                    url,
                    retry_index,
                    failure.message
                );
                CrawlOutcome::from_error(CrawlError {
                    url,
                    kind: failure.kind,
                    message: failure.message,
                    retries: retry_index,
                })
            }

            Ok(Document::UrlSet(entries)) => {
                tracing::debug!("urlset with {} entries at {}", entries.len(), url);
                let sites = entries
                    .iter()
                    .filter(|entry| site::retained(entry, ctx.config.lastmod.as_ref()))
                    .map(|entry| site::project(entry, ctx.config.fields.as_ref()))
                    .collect();
                CrawlOutcome::from_sites(sites)
            }

            Ok(Document::Index(children)) => {
                tracing::debug!("sitemap index with {} children at {}", children.len(), url);
                let lineage = Arc::new(Lineage::Node {
                    loc: url,
                    parent: lineage,
                });
                crawl_children(ctx, children, lineage).await
            }

            Ok(Document::Unknown) => {
                if retry_index < ctx.config.retries {
                    tracing::debug!(
                        "retry attempt {} / {} for {} after unrecognized document shape",
                        retry_index + 1,
                        ctx.config.retries,
                        url
                    );
                    return crawl_node(ctx, url, retry_index + 1, lineage).await;
                }

                CrawlOutcome::from_error(CrawlError {
                    url,
                    kind: ErrorKind::Internal,
                    message: "unrecognized document shape: root element is neither urlset nor sitemapindex".to_string(),
                    retries: retry_index,
                })
            }
        }
    })
}

/// One child branch of an index: cut as a cycle, or crawling as a task
enum ChildCrawl {
    Cycle(String),
    Task(String, JoinHandle<CrawlOutcome>),
}

/// Fans out over an index's children and merges their outcomes
///
/// Children are spawned up front and run concurrently, gated by the shared
/// limiter; awaiting them in listing order makes the merge stable however
/// they complete. A child that panics contributes one internal error for
/// its own location only.
async fn crawl_children(
    ctx: CrawlContext,
    children: Vec<String>,
    lineage: Arc<Lineage>,
) -> CrawlOutcome {
    let tasks: Vec<ChildCrawl> = children
        .into_iter()
        .map(|child| {
            if lineage.contains(&child) {
                ChildCrawl::Cycle(child)
            } else {
                let task = tokio::spawn(crawl_node(ctx.clone(), child.clone(), 0, lineage.clone()));
                ChildCrawl::Task(child, task)
            }
        })
        .collect();

    let mut merged = CrawlOutcome::default();
    for task in tasks {
        let outcome = match task {
            ChildCrawl::Cycle(loc) => {
                tracing::warn!("sitemap cycle: {} is its own ancestor", loc);
                CrawlOutcome::from_error(CrawlError {
                    url: loc,
                    kind: ErrorKind::Internal,
                    message: "sitemap cycle: index references itself or an ancestor".to_string(),
                    retries: 0,
                })
            }
            ChildCrawl::Task(loc, task) => match task.await {
                Ok(outcome) => outcome,
                Err(error) => CrawlOutcome::from_error(CrawlError {
                    url: loc,
                    kind: ErrorKind::Internal,
                    message: format!("crawl task failed: {}", error),
                    retries: 0,
                }),
            },
        };
        merged = merged.merge(outcome);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_contains_ancestors_only() {
        let root = Arc::new(Lineage::Root);
        let a = Arc::new(Lineage::Node {
            loc: "https://a.example/sitemap.xml".to_string(),
            parent: root,
        });
        let b = Arc::new(Lineage::Node {
            loc: "https://a.example/nested.xml".to_string(),
            parent: a.clone(),
        });

        assert!(b.contains("https://a.example/sitemap.xml"));
        assert!(b.contains("https://a.example/nested.xml"));
        assert!(!b.contains("https://a.example/other.xml"));
        assert!(!a.contains("https://a.example/nested.xml"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CrawlConfig {
            concurrency: 0,
            ..CrawlConfig::default()
        };
        assert!(Crawler::new(config).is_err());
    }
}
