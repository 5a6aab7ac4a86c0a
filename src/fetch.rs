//! Fetch stage: turn the daily manifest into extracted content records.
//!
//! Every manifest row is handled in order, one request at a time:
//!
//! 1. Look up the row's [`SourceProfile`] (case-insensitive source name).
//! 2. Drop the row if the profile's [`UrlRule`] rejects its URL. This happens
//!    before any request is made.
//! 3. Download the page, either directly or through the rendering session.
//! 4. Run the profile's extractor and write one JSON line.
//!
//! A row that fails in step 3 or 4 is logged with its URL and left out of
//! the output; the job carries on with the next row.

use crate::config::{Paths, PipelineConfig};
use crate::error::{FetchError, PipelineError};
use crate::extractors::{Extractor, GenericExtractor, SelectorExtractor};
use crate::http::{build_client, fetch_text};
use crate::manifest::{ContentWriter, read_manifest};
use crate::models::{ArticleFields, ContentRecord, DiscoveredArticle};
use crate::render::{HeadlessBrowser, Renderer};
use chrono::NaiveDate;
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Restricts a source to article URLs on one site and under one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRule {
    /// Registrable host; subdomains are accepted too.
    pub host: String,
    pub path_prefix: String,
}

impl UrlRule {
    pub fn new(host: &str, path_prefix: &str) -> Self {
        Self {
            host: host.to_ascii_lowercase(),
            path_prefix: path_prefix.to_string(),
        }
    }

    /// Whether `url` is on the rule's host and under its path prefix.
    /// Unparseable URLs are rejected.
    pub fn allows(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let host_ok = host == self.host || host.ends_with(&format!(".{}", self.host));
        host_ok && parsed.path().starts_with(&self.path_prefix)
    }
}

/// How a source's pages are downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET.
    Direct,
    /// Through the headless-browser session. Failures yield empty fields.
    Rendered,
}

/// Everything the fetch job needs to know about one source.
#[derive(Debug)]
pub struct SourceProfile {
    pub rule: Option<UrlRule>,
    pub mode: FetchMode,
    pub extractor: Box<dyn Extractor>,
}

impl SourceProfile {
    pub fn direct(extractor: impl Extractor + 'static) -> Self {
        Self {
            rule: None,
            mode: FetchMode::Direct,
            extractor: Box::new(extractor),
        }
    }

    pub fn rendered(extractor: impl Extractor + 'static) -> Self {
        Self {
            mode: FetchMode::Rendered,
            ..Self::direct(extractor)
        }
    }

    pub fn with_rule(mut self, rule: UrlRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn allows(&self, url: &str) -> bool {
        self.rule.as_ref().is_none_or(|rule| rule.allows(url))
    }
}

/// Mapping from source name to [`SourceProfile`], with a generic fallback.
///
/// Names are compared case-insensitively.
#[derive(Debug)]
pub struct SourceProfiles {
    profiles: HashMap<String, SourceProfile>,
    fallback: SourceProfile,
}

impl SourceProfiles {
    /// Only the generic fallback, no registered sources.
    pub fn empty() -> Self {
        Self {
            profiles: HashMap::new(),
            fallback: SourceProfile::direct(GenericExtractor),
        }
    }

    /// The sources this pipeline knows how to treat specially.
    pub fn builtin() -> Self {
        let mut profiles = Self::empty();
        profiles.register("NOS", SourceProfile::direct(SelectorExtractor::nos()));
        profiles.register(
            "TELEGRAAF",
            SourceProfile::direct(SelectorExtractor::telegraaf())
                .with_rule(UrlRule::new("telegraaf.nl", "/nieuws/")),
        );
        profiles.register("AD", SourceProfile::rendered(GenericExtractor));
        profiles
    }

    pub fn register(&mut self, source: &str, profile: SourceProfile) {
        self.profiles.insert(source.trim().to_uppercase(), profile);
    }

    pub fn lookup(&self, source: &str) -> &SourceProfile {
        self.profiles
            .get(&source.trim().to_uppercase())
            .unwrap_or(&self.fallback)
    }
}

impl Default for SourceProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Counts from one fetch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub written: usize,
    pub filtered: usize,
    pub failed: usize,
}

/// Download and extract a single manifest row.
///
/// Rendered sources never fail here: a missing session or a render error is
/// logged and produces empty fields.
#[instrument(level = "info", skip_all, fields(source = %article.source, url = %article.url))]
pub async fn fetch_row<R: Renderer>(
    client: &Client,
    profile: &SourceProfile,
    renderer: Option<&R>,
    article: &DiscoveredArticle,
) -> Result<ArticleFields, FetchError> {
    let html = match profile.mode {
        FetchMode::Direct => fetch_text::<FetchError>(client, &article.url).await?,
        FetchMode::Rendered => {
            let Some(renderer) = renderer else {
                warn!("No rendering session; emitting empty fields");
                return Ok(ArticleFields::default());
            };
            match renderer.render(&article.url).await {
                Ok(dom) => dom,
                Err(e) => {
                    warn!(error = %e, "Rendering failed; emitting empty fields");
                    return Ok(ArticleFields::default());
                }
            }
        }
    };

    let fields = profile.extractor.extract(&html)?;
    debug!(extractor = profile.extractor.name(), title = %fields.title, "Extracted article");
    Ok(fields)
}

/// Process every manifest row in order and write the surviving records.
///
/// # Errors
///
/// Only failures writing the content file abort the run. Per-row failures
/// are logged and counted in the returned [`FetchReport`].
#[instrument(level = "info", skip_all, fields(rows = manifest.len(), output = %writer.path().display()))]
pub async fn run_fetch<R: Renderer>(
    client: &Client,
    profiles: &SourceProfiles,
    renderer: Option<&R>,
    manifest: Vec<DiscoveredArticle>,
    writer: &mut ContentWriter,
) -> Result<FetchReport, PipelineError> {
    let mut report = FetchReport::default();

    for article in manifest {
        let profile = profiles.lookup(&article.source);
        if !profile.allows(&article.url) {
            debug!(source = %article.source, url = %article.url, "URL outside source allow-list; skipping");
            report.filtered += 1;
            continue;
        }

        match fetch_row(client, profile, renderer, &article).await {
            Ok(fields) => {
                writer.write(&ContentRecord::new(article, fields)).await?;
                report.written += 1;
            }
            Err(e) => {
                error!(source = %article.source, url = %article.url, error = %e, "Error fetching content");
                report.failed += 1;
            }
        }
    }

    info!(
        written = report.written,
        filtered = report.filtered,
        failed = report.failed,
        "Fetch complete"
    );
    Ok(report)
}

/// The whole fetch job: read the manifest for `date`, process every row and
/// write the content file.
///
/// The rendering session is launched up front when the manifest contains a
/// row for a rendered source. If no browser can be started those rows get
/// empty fields.
///
/// # Errors
///
/// A missing or malformed manifest, or a failure writing the content file,
/// aborts the job.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn run_job(
    paths: &Paths,
    config: &PipelineConfig,
    profiles: &SourceProfiles,
    date: NaiveDate,
) -> Result<FetchReport, PipelineError> {
    let manifest = read_manifest(&paths.manifest(date))?;
    let client = build_client(config)?;

    let wants_renderer = manifest
        .iter()
        .any(|row| profiles.lookup(&row.source).mode == FetchMode::Rendered);
    let session = if wants_renderer {
        match HeadlessBrowser::launch(&config.renderer) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Could not start rendering session; rendered sources will be empty");
                None
            }
        }
    } else {
        None
    };

    let mut writer = ContentWriter::create(&paths.content(date)).await?;
    let report = run_fetch(&client, profiles, session.as_ref(), manifest, &mut writer).await?;
    info!(path = %writer.path().display(), written = writer.written(), "Wrote content file");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    #[derive(Debug)]
    struct FixedRenderer(Result<&'static str, ()>);

    impl Renderer for FixedRenderer {
        async fn render(&self, _url: &str) -> Result<String, RenderError> {
            self.0
                .map(str::to_string)
                .map_err(|_| RenderError::Timeout(1))
        }
    }

    fn article(source: &str, url: &str) -> DiscoveredArticle {
        DiscoveredArticle {
            source: source.to_string(),
            url: url.to_string(),
            date_found: "2024-01-06".to_string(),
            date_published: String::new(),
            time_published: String::new(),
        }
    }

    #[test]
    fn test_url_rule() {
        let rule = UrlRule::new("telegraaf.nl", "/nieuws/");
        assert!(rule.allows("https://www.telegraaf.nl/nieuws/123/titel"));
        assert!(rule.allows("https://telegraaf.nl/nieuws/1"));
        assert!(!rule.allows("https://telegraaf.nl/sport/123"));
        assert!(!rule.allows("https://example.com/nieuws/1"));
        assert!(!rule.allows("https://nottelegraaf.nl/nieuws/1"));
        assert!(!rule.allows("not a url"));
    }

    #[test]
    fn test_lookup_is_case_insensitive_with_fallback() {
        let profiles = SourceProfiles::builtin();
        assert_eq!(profiles.lookup("nos").extractor.name(), "nos");
        assert_eq!(profiles.lookup(" Telegraaf ").extractor.name(), "telegraaf");
        assert_eq!(profiles.lookup("ad").mode, FetchMode::Rendered);
        assert_eq!(profiles.lookup("UNKNOWN").extractor.name(), "generic");
        assert_eq!(profiles.lookup("UNKNOWN").mode, FetchMode::Direct);
    }

    #[test]
    fn test_telegraaf_profile_filters() {
        let profiles = SourceProfiles::builtin();
        let profile = profiles.lookup("TELEGRAAF");
        assert!(!profile.allows("https://telegraaf.nl/sport/123"));
        assert!(profile.allows("https://www.telegraaf.nl/nieuws/123"));
        assert!(profiles.lookup("NOS").allows("https://nos.nl/sport/1"));
    }

    #[tokio::test]
    async fn test_rendered_row_uses_dom() {
        let profile = SourceProfile::rendered(GenericExtractor);
        let renderer = FixedRenderer(Ok("<title>Na consent</title><p>Tekst</p>"));
        let fields = fetch_row(
            &Client::new(),
            &profile,
            Some(&renderer),
            &article("AD", "https://www.ad.nl/a"),
        )
        .await
        .unwrap();
        assert_eq!(fields.title, "Na consent");
        assert_eq!(fields.body, "Tekst");
    }

    #[tokio::test]
    async fn test_rendered_row_failure_falls_back_to_empty() {
        let profile = SourceProfile::rendered(GenericExtractor);
        let renderer = FixedRenderer(Err(()));
        let fields = fetch_row(
            &Client::new(),
            &profile,
            Some(&renderer),
            &article("AD", "https://www.ad.nl/a"),
        )
        .await
        .unwrap();
        assert_eq!(fields, ArticleFields::default());
    }

    #[tokio::test]
    async fn test_rendered_row_without_session() {
        let profile = SourceProfile::rendered(GenericExtractor);
        let fields = fetch_row(
            &Client::new(),
            &profile,
            None::<&FixedRenderer>,
            &article("AD", "https://www.ad.nl/a"),
        )
        .await
        .unwrap();
        assert_eq!(fields, ArticleFields::default());
    }
}
