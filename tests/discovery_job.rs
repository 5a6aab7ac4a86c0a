// Integration tests for the discovery job against a local HTTP server.

use chrono::NaiveDate;
use daily_news_scraper::manifest::read_manifest;
use daily_news_scraper::{DiscoveredArticle, Paths, PipelineConfig, PipelineError, discovery};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use std::path::Path;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <link>https://example.com/</link>
    <description>Example feed</description>
    <item>
      <title>A</title>
      <link>https://example.com/a</link>
      <pubDate>Fri, 05 Jan 2024 10:30:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

fn run_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
}

fn setup(base: &Path, registry: &str) -> Paths {
    let discovery_dir = base.join("discovery");
    std::fs::create_dir_all(&discovery_dir).unwrap();
    std::fs::write(discovery_dir.join("sources.csv"), registry).unwrap();
    Paths::resolve(base, None, &PipelineConfig::default())
}

#[tokio::test]
async fn test_single_rss_source_produces_one_row() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(FEED);
    });

    let dir = tempfile::tempdir().unwrap();
    let paths = setup(
        dir.path(),
        &format!("source,url,type\nEXAMPLE,{},RSS\n", server.url("/feed.xml")),
    );

    let report = discovery::run_job(&paths, &PipelineConfig::default(), run_day())
        .await
        .unwrap();
    feed.assert();
    assert_eq!(report.sources_ok, 1);

    let raw = std::fs::read_to_string(paths.manifest(run_day())).unwrap();
    assert_eq!(
        raw,
        "source,url,date_found,date_published,time_published\n\
         EXAMPLE,https://example.com/a,2024-01-06,2024-01-05,10:30:00\n"
    );
}

#[tokio::test]
async fn test_rerun_appends_duplicate_rows() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200).body(FEED);
    });

    let dir = tempfile::tempdir().unwrap();
    let paths = setup(
        dir.path(),
        &format!("source,url,type\nEXAMPLE,{},rss\n", server.url("/feed.xml")),
    );

    let config = PipelineConfig::default();
    discovery::run_job(&paths, &config, run_day()).await.unwrap();
    discovery::run_job(&paths, &config, run_day()).await.unwrap();

    let rows = read_manifest(&paths.manifest(run_day())).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], rows[1]);
    assert_eq!(rows[0].url, "https://example.com/a");
}

#[tokio::test]
async fn test_failures_and_unknown_types_do_not_abort() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/broken.xml");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/listing");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(r#"<html><body>
                <a href="https://site.test/artikel/1">Een</a>
                <a href="/intern">Intern</a>
                <a href="https://site.test/artikel/2">Twee</a>
            </body></html>"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/notafeed");
        then.status(200).body("<html>not a feed</html>");
    });

    let dir = tempfile::tempdir().unwrap();
    let registry = format!(
        "source,url,type\n\
         BROKEN,{broken},RSS\n\
         GARBAGE,{garbage},RSS\n\
         PODCAST,https://example.com/pod,AUDIO\n\
         SITE,{listing},HTML/SITE\n",
        broken = server.url("/broken.xml"),
        garbage = server.url("/notafeed"),
        listing = server.url("/listing"),
    );
    let paths = setup(dir.path(), &registry);

    let report = discovery::run_job(&paths, &PipelineConfig::default(), run_day())
        .await
        .unwrap();
    assert_eq!(report.sources_ok, 1);
    assert_eq!(report.sources_failed, 2);
    assert_eq!(report.sources_skipped, 1);

    let rows = read_manifest(&paths.manifest(run_day())).unwrap();
    assert_eq!(
        rows,
        vec![
            DiscoveredArticle::undated("SITE", "https://site.test/artikel/1", run_day()),
            DiscoveredArticle::undated("SITE", "https://site.test/artikel/2", run_day()),
        ]
    );
}

#[tokio::test]
async fn test_missing_registry_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::resolve(dir.path(), None, &PipelineConfig::default());

    let err = discovery::run_job(&paths, &PipelineConfig::default(), run_day())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Io { .. }));
    assert!(!paths.manifest(run_day()).exists());
}
