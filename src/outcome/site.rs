//! Site projection and lastmod filtering
//!
//! A urlset entry is projected to either its bare location (the default) or
//! a record of the selected named fields, after the optional minimum-lastmod
//! filter has been applied.

use crate::config::{FieldSelection, SitemapField};
use crate::crawler::{parse_lastmod, UrlEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One extracted site: a bare location or a selected-field record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Site {
    Url(String),
    Fields(BTreeMap<String, String>),
}

impl Site {
    /// The page location, if present in this projection
    pub fn location(&self) -> Option<&str> {
        match self {
            Site::Url(loc) => Some(loc),
            Site::Fields(record) => record.get(SitemapField::Loc.name()).map(String::as_str),
        }
    }
}

/// Whether an entry survives the minimum-lastmod filter
///
/// With a threshold set, an entry is kept iff its lastmod parses and is not
/// strictly older than the threshold. Entries without a (parseable) lastmod
/// are dropped. Without a threshold every entry is kept.
pub(crate) fn retained(entry: &UrlEntry, threshold: Option<&DateTime<Utc>>) -> bool {
    let Some(min) = threshold else {
        return true;
    };
    entry
        .lastmod
        .as_deref()
        .and_then(parse_lastmod)
        .is_some_and(|t| t >= *min)
}

/// Projects an entry to its output shape
///
/// Selected fields missing from the entry are omitted from the record rather
/// than failing the branch.
pub(crate) fn project(entry: &UrlEntry, fields: Option<&FieldSelection>) -> Site {
    let Some(selection) = fields else {
        return Site::Url(entry.loc.clone());
    };

    let mut record = BTreeMap::new();
    for field in selection {
        let value = match field {
            SitemapField::Loc => Some(entry.loc.as_str()),
            SitemapField::Lastmod => entry.lastmod.as_deref(),
            SitemapField::Changefreq => entry.changefreq.as_deref(),
            SitemapField::Priority => entry.priority.as_deref(),
        };
        if let Some(value) = value {
            record.insert(field.name().to_string(), value.to_string());
        }
    }
    Site::Fields(record)
}
