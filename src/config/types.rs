use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// A recognized sitemap entry field, selectable for projection
///
/// Field extraction is an enumerated set, not reflection: only the fields
/// named here can be projected into output records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SitemapField {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

impl SitemapField {
    /// The field's element name as it appears in sitemap documents
    pub fn name(&self) -> &'static str {
        match self {
            SitemapField::Loc => "loc",
            SitemapField::Lastmod => "lastmod",
            SitemapField::Changefreq => "changefreq",
            SitemapField::Priority => "priority",
        }
    }

    /// Parses an element name back into a field
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "loc" => Some(SitemapField::Loc),
            "lastmod" => Some(SitemapField::Lastmod),
            "changefreq" => Some(SitemapField::Changefreq),
            "priority" => Some(SitemapField::Priority),
            _ => None,
        }
    }
}

/// The set of fields to project instead of bare locations
pub type FieldSelection = BTreeSet<SitemapField>;

/// Crawl configuration, immutable for the lifetime of one crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Default root sitemap URL, used by the CLI when none is given
    pub url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Minimum lastmod threshold; entries older than this (or without a
    /// parseable lastmod) are excluded. Quoted RFC 3339 in TOML.
    pub lastmod: Option<DateTime<Utc>>,

    /// Extra headers sent with every request
    #[serde(rename = "request-headers")]
    pub request_headers: BTreeMap<String, String>,

    /// Maximum concurrent sitemap fetches across the whole crawl tree
    pub concurrency: usize,

    /// Retry attempts per sitemap URL before recording an error
    pub retries: u32,

    /// Whether to validate TLS certificates
    #[serde(rename = "verify-tls")]
    pub verify_tls: bool,

    /// Project these named fields instead of bare locations
    pub fields: Option<FieldSelection>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: 15_000,
            lastmod: None,
            request_headers: BTreeMap::new(),
            concurrency: 10,
            retries: 0,
            verify_tls: true,
            fields: None,
        }
    }
}
