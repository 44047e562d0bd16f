//! Crawl outcome types
//!
//! This module contains the value types a crawl produces:
//! - Per-branch results ([`CrawlOutcome`]) and their order-preserving merge
//! - Structured per-URL errors ([`CrawlError`], [`ErrorKind`])
//! - The URL-tagged top-level report ([`SitemapReport`])
//!
//! Outcomes are plain immutable values. Concurrent branches each own their
//! partial outcome until the parent merges them, so no locking is involved.

pub(crate) mod site;

pub use site::Site;

use serde::Serialize;
use std::fmt;

/// Classification of a failed crawl branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The request did not complete within the configured deadline
    Timeout,

    /// The server answered with a non-200 status
    #[serde(rename = "HttpError")]
    Http,

    /// The body was not decodable sitemap XML (including gunzip failures)
    #[serde(rename = "ParseError")]
    Parse,

    /// Transport failure, task failure, or unrecognized document shape
    #[serde(rename = "InternalError")]
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Http => "HttpError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Internal => "InternalError",
        };
        f.write_str(name)
    }
}

/// One URL whose fetch/parse ultimately failed after exhausting retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlError {
    /// The sitemap URL that failed
    pub url: String,

    /// What went wrong
    pub kind: ErrorKind,

    /// Human-readable failure detail
    pub message: String,

    /// How many retries were attempted before giving up
    pub retries: u32,
}

/// The result of crawling one subtree: extracted sites plus branch errors
///
/// A failing branch contributes errors and no sites; a healthy branch
/// contributes sites and no errors. Every URL visited lands in exactly one
/// of the two sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlOutcome {
    pub sites: Vec<Site>,
    pub errors: Vec<CrawlError>,
}

impl CrawlOutcome {
    /// Outcome of a leaf urlset: sites only
    pub fn from_sites(sites: Vec<Site>) -> Self {
        Self {
            sites,
            errors: Vec::new(),
        }
    }

    /// Outcome of a branch that gave up: one error, no sites
    pub fn from_error(error: CrawlError) -> Self {
        Self {
            sites: Vec::new(),
            errors: vec![error],
        }
    }

    /// Concatenates another outcome onto this one, preserving order
    ///
    /// Associative: merging child outcomes in listing order yields the same
    /// sequences regardless of how the merges are grouped.
    pub fn merge(mut self, other: CrawlOutcome) -> CrawlOutcome {
        self.sites.extend(other.sites);
        self.errors.extend(other.errors);
        self
    }
}

/// The top-level crawl result, tagged with the requested root URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapReport {
    /// The root sitemap URL this report was produced for
    pub url: String,

    /// All sites extracted from reachable leaf sitemaps, in tree order
    pub sites: Vec<Site>,

    /// One entry per branch that stayed unreachable after retries
    pub errors: Vec<CrawlError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(loc: &str) -> Site {
        Site::Url(loc.to_string())
    }

    fn error(url: &str) -> CrawlError {
        CrawlError {
            url: url.to_string(),
            kind: ErrorKind::Http,
            message: "HTTP 500".to_string(),
            retries: 0,
        }
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let a = CrawlOutcome::from_sites(vec![site("https://a.example/1")]);
        let b = CrawlOutcome::from_error(error("https://b.example/sitemap.xml"));
        let c = CrawlOutcome::from_sites(vec![site("https://c.example/1"), site("https://c.example/2")]);

        let merged = a.merge(b).merge(c);
        assert_eq!(merged.sites.len(), 3);
        assert_eq!(merged.sites[0], site("https://a.example/1"));
        assert_eq!(merged.sites[2], site("https://c.example/2"));
        assert_eq!(merged.errors.len(), 1);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = CrawlOutcome::from_sites(vec![site("a")]);
        let b = CrawlOutcome::from_error(error("b"));
        let c = CrawlOutcome::from_sites(vec![site("c")]);

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_merge_with_default_is_identity() {
        let a = CrawlOutcome::from_sites(vec![site("a")]);
        assert_eq!(a.clone().merge(CrawlOutcome::default()), a);
        assert_eq!(CrawlOutcome::default().merge(a.clone()), a);
    }

    #[test]
    fn test_error_kind_display_names() {
        assert_eq!(ErrorKind::Timeout.to_string(), "Timeout");
        assert_eq!(ErrorKind::Http.to_string(), "HttpError");
        assert_eq!(ErrorKind::Parse.to_string(), "ParseError");
        assert_eq!(ErrorKind::Internal.to_string(), "InternalError");
    }
}
