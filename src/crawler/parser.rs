//! Sitemap XML parsing
//!
//! This module turns decoded response text into a [`Document`]:
//! - `<urlset>` becomes a list of [`UrlEntry`] values (leaf sitemap)
//! - `<sitemapindex>` becomes a list of child sitemap locations
//! - any other well-formed root is reported as [`Document::Unknown`]
//!
//! Parsing is event-based; documents are never materialized as a DOM.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<url>` entry from a urlset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// The page location (`<loc>`)
    pub loc: String,

    /// Raw `<lastmod>` text, as written in the document
    pub lastmod: Option<String>,

    /// Raw `<changefreq>` text
    pub changefreq: Option<String>,

    /// Raw `<priority>` text
    pub priority: Option<String>,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// A leaf sitemap listing page locations
    UrlSet(Vec<UrlEntry>),

    /// An index listing child sitemap locations
    Index(Vec<String>),

    /// Well-formed XML whose root is neither `urlset` nor `sitemapindex`
    Unknown,
}

/// Parses sitemap XML into a [`Document`]
///
/// The root element decides the document shape. Entries without a `<loc>`
/// are skipped. Malformed XML is returned as an error; an unrecognized root
/// is not an error here, the crawler decides how to treat it.
pub fn parse_document(text: &str) -> std::result::Result<Document, quick_xml::Error> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut root: Option<Document> = None;
    let mut in_container = false;
    let mut entries: Vec<UrlEntry> = Vec::new();
    let mut children: Vec<String> = Vec::new();

    // Current <url> entry fields, committed when the element closes
    let mut loc = String::new();
    let mut lastmod: Option<String> = None;
    let mut changefreq: Option<String> = None;
    let mut priority: Option<String> = None;

    // Text accumulator for the field element currently open
    let mut field: Option<&'static str> = None;
    let mut value = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"urlset" if root.is_none() => root = Some(Document::UrlSet(Vec::new())),
                b"sitemapindex" if root.is_none() => root = Some(Document::Index(Vec::new())),
                _ if root.is_none() => return Ok(Document::Unknown),
                b"url" => {
                    in_container = true;
                    loc.clear();
                    lastmod = None;
                    changefreq = None;
                    priority = None;
                }
                b"sitemap" => {
                    in_container = true;
                    loc.clear();
                }
                b"loc" => {
                    field = Some("loc");
                    value.clear();
                }
                b"lastmod" => {
                    field = Some("lastmod");
                    value.clear();
                }
                b"changefreq" => {
                    field = Some("changefreq");
                    value.clear();
                }
                b"priority" => {
                    field = Some("priority");
                    value.clear();
                }
                _ => {}
            },
            Event::Text(e) => {
                if field.is_some() {
                    value.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Event::CData(e) => {
                if field.is_some() {
                    value.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"loc" | b"lastmod" | b"changefreq" | b"priority" => {
                    let text = value.trim().to_string();
                    match field.take() {
                        Some("loc") => loc = text,
                        Some("lastmod") if !text.is_empty() => lastmod = Some(text),
                        Some("changefreq") if !text.is_empty() => changefreq = Some(text),
                        Some("priority") if !text.is_empty() => priority = Some(text),
                        _ => {}
                    }
                }
                b"url" => {
                    in_container = false;
                    if !loc.is_empty() {
                        entries.push(UrlEntry {
                            loc: std::mem::take(&mut loc),
                            lastmod: lastmod.take(),
                            changefreq: changefreq.take(),
                            priority: priority.take(),
                        });
                    }
                }
                b"sitemap" => {
                    in_container = false;
                    if !loc.is_empty() {
                        children.push(std::mem::take(&mut loc));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        // Field elements only count inside a <url> or <sitemap> container
        if !in_container {
            field = None;
        }
    }

    match root {
        Some(Document::UrlSet(_)) => Ok(Document::UrlSet(entries)),
        Some(Document::Index(_)) => Ok(Document::Index(children)),
        _ => Ok(Document::Unknown),
    }
}

/// Parses a sitemap `<lastmod>` value (W3C datetime subset)
///
/// Accepts a full RFC 3339 instant or a bare `YYYY-MM-DD` date, which is
/// taken as midnight UTC. Anything else yields `None`.
pub fn parse_lastmod(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset_with_metadata() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/page1</loc>
    <lastmod>2024-01-15</lastmod>
    <changefreq>weekly</changefreq>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>https://example.com/page2</loc>
  </url>
</urlset>"#;

        let document = parse_document(xml).unwrap();
        let Document::UrlSet(entries) = document else {
            panic!("expected a urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, "https://example.com/page1");
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-01-15"));
        assert_eq!(entries[0].changefreq.as_deref(), Some("weekly"));
        assert_eq!(entries[0].priority.as_deref(), Some("0.8"));
        assert_eq!(entries[1].loc, "https://example.com/page2");
        assert!(entries[1].lastmod.is_none());
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap-a.xml</loc></sitemap>
  <sitemap>
    <loc>https://example.com/sitemap-b.xml.gz</loc>
    <lastmod>2024-02-01T10:00:00Z</lastmod>
  </sitemap>
</sitemapindex>"#;

        let document = parse_document(xml).unwrap();
        assert_eq!(
            document,
            Document::Index(vec![
                "https://example.com/sitemap-a.xml".to_string(),
                "https://example.com/sitemap-b.xml.gz".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let xml = r#"<urlset>
  <url><loc>https://example.com/search?q=test&amp;page=1</loc></url>
</urlset>"#;

        let Document::UrlSet(entries) = parse_document(xml).unwrap() else {
            panic!("expected a urlset");
        };
        assert_eq!(entries[0].loc, "https://example.com/search?q=test&page=1");
    }

    #[test]
    fn test_parse_skips_entries_without_loc() {
        let xml = r#"<urlset>
  <url><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://example.com/kept</loc></url>
</urlset>"#;

        let Document::UrlSet(entries) = parse_document(xml).unwrap() else {
            panic!("expected a urlset");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, "https://example.com/kept");
    }

    #[test]
    fn test_parse_empty_urlset() {
        let document = parse_document("<urlset></urlset>").unwrap();
        assert_eq!(document, Document::UrlSet(vec![]));
    }

    #[test]
    fn test_parse_unrecognized_root() {
        let xml = r#"<rss version="2.0"><channel><title>Feed</title></channel></rss>"#;
        assert_eq!(parse_document(xml).unwrap(), Document::Unknown);
    }

    #[test]
    fn test_parse_malformed_xml_is_an_error() {
        assert!(parse_document("<urlset><url></wrong></urlset>").is_err());
    }

    #[test]
    fn test_parse_lastmod_variants() {
        let full = parse_lastmod("2024-01-15T08:30:00+01:00").unwrap();
        assert_eq!(full.to_rfc3339(), "2024-01-15T07:30:00+00:00");

        let date_only = parse_lastmod("2024-01-15").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2024-01-15T00:00:00+00:00");

        assert!(parse_lastmod("last tuesday").is_none());
        assert!(parse_lastmod("").is_none());
    }
}
