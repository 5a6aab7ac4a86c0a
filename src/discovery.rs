//! Discovery stage: turn the source registry into a daily manifest.
//!
//! Each registry entry is polled once, in registry order:
//!
//! | Type   | Mechanism | Publish date/time |
//! |--------|-----------|-------------------|
//! | `RSS`  | Parse the feed, take each entry's canonical link | From the entry's publish timestamp (UTC), else empty |
//! | `HTML` | Parse the listing page, take every `<a href>` starting with `http` | Always empty |
//!
//! A source that fails is logged and skipped; the remaining sources are still
//! polled. Nothing is deduplicated, so a URL linked twice on a listing page
//! yields two rows.

use crate::config::{Paths, PipelineConfig};
use crate::error::{DiscoveryError, PipelineError};
use crate::http::{build_client, fetch_bytes, fetch_text};
use crate::manifest::append_manifest;
use crate::models::{DiscoveredArticle, FetchType, SourceEntry};
use crate::registry::load_sources;
use chrono::NaiveDate;
use feed_rs::model::Entry;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Result of one discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Every discovered record, in registry then feed/DOM order.
    pub articles: Vec<DiscoveredArticle>,
    pub sources_ok: usize,
    pub sources_failed: usize,
    /// Entries with an unrecognised fetch type.
    pub sources_skipped: usize,
}

/// The article URL of a feed entry.
///
/// Prefers the first `alternate` (or untyped) link, then any link, then an
/// `http(s)` entry id such as an RSS permalink `guid`.
fn canonical_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|link| link.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|link| link.href.clone())
        .or_else(|| {
            let id = entry.id.trim();
            Url::parse(id)
                .ok()
                .filter(|url| matches!(url.scheme(), "http" | "https"))
                .map(|_| id.to_string())
        })
}

/// Extract manifest rows from a feed document.
///
/// Entries without a usable link are skipped. The publish timestamp, when the
/// entry carries one, is split into UTC date and time components.
pub fn parse_feed_entries(
    source: &str,
    feed: &[u8],
    date_found: NaiveDate,
) -> Result<Vec<DiscoveredArticle>, DiscoveryError> {
    let feed = feed_rs::parser::parse(feed)?;

    let articles = feed
        .entries
        .into_iter()
        .filter_map(|entry| match canonical_link(&entry) {
            Some(link) => Some(DiscoveredArticle::published(
                source,
                &link,
                date_found,
                entry.published,
            )),
            None => {
                debug!(%source, id = %entry.id, "Feed entry has no link; skipping");
                None
            }
        })
        .collect();
    Ok(articles)
}

/// Extract manifest rows from a listing page: every anchor whose `href`
/// starts with `http`, in document order.
pub fn parse_listing_links(source: &str, html: &str, date_found: NaiveDate) -> Vec<DiscoveredArticle> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .map(|href| DiscoveredArticle::undated(source, href, date_found))
        .collect()
}

/// Fetch and parse an RSS/Atom feed.
#[instrument(level = "info", skip_all, fields(source = %entry.name, url = %entry.url))]
pub async fn discover_rss(
    client: &Client,
    entry: &SourceEntry,
    date_found: NaiveDate,
) -> Result<Vec<DiscoveredArticle>, DiscoveryError> {
    let body = fetch_bytes::<DiscoveryError>(client, &entry.url).await?;
    parse_feed_entries(&entry.name, &body, date_found)
}

/// Fetch a listing page and collect its absolute links.
#[instrument(level = "info", skip_all, fields(source = %entry.name, url = %entry.url))]
pub async fn discover_html(
    client: &Client,
    entry: &SourceEntry,
    date_found: NaiveDate,
) -> Result<Vec<DiscoveredArticle>, DiscoveryError> {
    let html = fetch_text::<DiscoveryError>(client, &entry.url).await?;
    Ok(parse_listing_links(&entry.name, &html, date_found))
}

/// Poll a single registry entry according to its fetch type.
pub async fn discover_source(
    client: &Client,
    entry: &SourceEntry,
    date_found: NaiveDate,
) -> Result<Vec<DiscoveredArticle>, DiscoveryError> {
    match &entry.fetch_type {
        FetchType::Rss => discover_rss(client, entry, date_found).await,
        FetchType::Html => discover_html(client, entry, date_found).await,
        FetchType::Unknown(kind) => Err(DiscoveryError::UnknownType(kind.clone())),
    }
}

/// Poll every source in order, one request at a time.
///
/// Per-source failures are logged with the source name and URL and counted
/// in the report; they never abort the run.
#[instrument(level = "info", skip_all, fields(sources = sources.len(), %date_found))]
pub async fn run_discovery(
    client: &Client,
    sources: &[SourceEntry],
    date_found: NaiveDate,
) -> DiscoveryReport {
    let outcomes: Vec<(&SourceEntry, Result<Vec<DiscoveredArticle>, DiscoveryError>)> =
        stream::iter(sources)
            .then(|entry| async move { (entry, discover_source(client, entry, date_found).await) })
            .collect()
            .await;

    let mut report = DiscoveryReport::default();
    for (entry, outcome) in outcomes {
        match outcome {
            Ok(mut articles) => {
                info!(source = %entry.name, count = articles.len(), "Discovered articles");
                report.sources_ok += 1;
                report.articles.append(&mut articles);
            }
            Err(DiscoveryError::UnknownType(kind)) => {
                warn!(source = %entry.name, %kind, "Unknown source type; skipping");
                report.sources_skipped += 1;
            }
            Err(e) => {
                error!(source = %entry.name, url = %entry.url, error = %e, "Failed to poll source");
                report.sources_failed += 1;
            }
        }
    }

    info!(
        total = report.articles.len(),
        ok = report.sources_ok,
        failed = report.sources_failed,
        skipped = report.sources_skipped,
        "Discovery complete"
    );
    report
}

/// The whole discovery job: load the registry, poll every source and append
/// the results to the manifest for `date`.
///
/// # Errors
///
/// Only configuration and output failures abort the job.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn run_job(
    paths: &Paths,
    config: &PipelineConfig,
    date: NaiveDate,
) -> Result<DiscoveryReport, PipelineError> {
    let sources = load_sources(&paths.sources)?;
    let client = build_client(config)?;

    let report = run_discovery(&client, &sources, date).await;

    let manifest = paths.manifest(date);
    append_manifest(&manifest, &report.articles)?;
    info!("Generated: {}", manifest.display());
    Ok(report)
}
