//! Configuration module for Sitemap-Sweep
//!
//! Crawl parameters live in [`CrawlConfig`], passed in-process to the
//! crawler. This module also loads and validates TOML configuration files
//! for the command-line surface.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Crawling with concurrency: {}", config.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, FieldSelection, SitemapField};

// Re-export parser and validation functions
pub use parser::load_config;
pub use validation::validate;
