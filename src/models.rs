//! Data models shared by the discovery and fetch stages.
//!
//! - [`SourceEntry`]: one row of the source registry
//! - [`DiscoveredArticle`]: one row of the daily manifest
//! - [`ArticleFields`]: the fields an extractor pulls out of a page
//! - [`ContentRecord`]: a manifest row joined with its extracted fields,
//!   written as one JSON line

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a source is polled during discovery.
///
/// Registry values are matched after trimming and uppercasing, so `rss`,
/// ` RSS ` and `Rss` are equivalent. `HTML/SITE` is an alias for `HTML`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FetchType {
    Rss,
    Html,
    /// Anything else. Kept verbatim so discovery can log and skip it.
    Unknown(String),
}

impl From<String> for FetchType {
    fn from(raw: String) -> Self {
        FetchType::from(raw.as_str())
    }
}

impl From<&str> for FetchType {
    fn from(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "RSS" => FetchType::Rss,
            "HTML" | "HTML/SITE" => FetchType::Html,
            other => FetchType::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for FetchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchType::Rss => f.write_str("RSS"),
            FetchType::Html => f.write_str("HTML"),
            FetchType::Unknown(other) => f.write_str(other),
        }
    }
}

/// A configured news origin from the source registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    /// Display name, also used as the manifest `source` column.
    #[serde(rename = "source")]
    pub name: String,
    /// Feed or listing page URL.
    pub url: String,
    #[serde(rename = "type")]
    pub fetch_type: FetchType,
}

/// One candidate article URL found during discovery.
///
/// Publish date and time are empty strings, never absent, when the source
/// carries no timestamp. This is also the manifest CSV row layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredArticle {
    pub source: String,
    pub url: String,
    /// The run date (`YYYY-MM-DD`).
    pub date_found: String,
    /// `YYYY-MM-DD` or empty.
    #[serde(default)]
    pub date_published: String,
    /// `HH:MM:SS` or empty.
    #[serde(default)]
    pub time_published: String,
}

impl DiscoveredArticle {
    /// Build a record with no publish information.
    pub fn undated(source: &str, url: &str, date_found: NaiveDate) -> Self {
        Self {
            source: source.to_string(),
            url: url.to_string(),
            date_found: date_found.to_string(),
            date_published: String::new(),
            time_published: String::new(),
        }
    }

    /// Build a record, splitting `published` into ISO date and time parts.
    pub fn published(
        source: &str,
        url: &str,
        date_found: NaiveDate,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        let mut article = Self::undated(source, url, date_found);
        if let Some(ts) = published {
            article.date_published = ts.format("%Y-%m-%d").to_string();
            article.time_published = ts.format("%H:%M:%S").to_string();
        }
        article
    }
}

/// Structured fields extracted from an article page.
///
/// Every field defaults to empty; an extractor that cannot find a piece of
/// markup leaves the corresponding field at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub title: String,
    pub lead: String,
    pub body: String,
    pub author: String,
    pub tags: Vec<String>,
}

/// A manifest row plus the fields extracted from its page.
///
/// Serialized flat: the manifest columns come first, followed by `title`,
/// `lead`, `body`, `author` and `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(flatten)]
    pub article: DiscoveredArticle,
    #[serde(flatten)]
    pub fields: ArticleFields,
}

impl ContentRecord {
    pub fn new(article: DiscoveredArticle, fields: ArticleFields) -> Self {
        Self { article, fields }
    }
}
