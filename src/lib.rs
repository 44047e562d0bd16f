//! Sitemap-Sweep: a sitemap tree flattener
//!
//! This crate fetches a root sitemap URL, recursively follows nested sitemap
//! indexes, and flattens the tree into one list of page locations (or
//! structured field records), tolerating network failures on any branch.

pub mod config;
pub mod crawler;
pub mod outcome;

use thiserror::Error;

/// Main error type for Sitemap-Sweep operations
///
/// Only setup can fail: a crawl itself always resolves to a
/// [`SitemapReport`](outcome::SitemapReport) carrying per-branch errors.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitemap-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlConfig, FieldSelection, SitemapField};
pub use crawler::{flatten, Crawler};
pub use outcome::{CrawlError, CrawlOutcome, ErrorKind, Site, SitemapReport};
