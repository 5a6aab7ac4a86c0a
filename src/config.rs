//! Pipeline configuration and on-disk layout.
//!
//! Settings come from two places: command-line flags (see [`crate::cli`]) and
//! an optional YAML file. The YAML file only tunes behaviour; every key has a
//! default so an empty file, or no file at all, is valid.
//!
//! ```yaml
//! user_agent: "Mozilla/5.0 (compatible; daily-news-scraper)"
//! request_timeout_secs: 20
//! output_dir: /var/lib/news/output
//! renderer:
//!   browser: /usr/bin/chromium
//!   timeout_secs: 45
//! ```
//!
//! # File layout
//!
//! ```text
//! <base_dir>/
//! └── discovery/
//!     ├── sources.csv
//!     └── output/
//!         ├── articles_2024-01-06.csv
//!         └── content_2024-01-06.jsonl
//! ```

use crate::error::PipelineError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Tunables loaded from the optional YAML config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Whole-request timeout. Unset means the HTTP client's own default.
    pub request_timeout_secs: Option<u64>,
    /// Overrides `<base_dir>/discovery/output`.
    pub output_dir: Option<PathBuf>,
    pub renderer: RendererConfig,
}

/// Settings for the headless browser used by script-rendered sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Browser binary. When unset, `PATH` is searched for a Chromium build.
    pub browser: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            output_dir: None,
            renderer: RendererConfig::default(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            browser: None,
            timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// A path that was given explicitly but cannot be read or parsed is a
    /// configuration failure.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config = Self::from_yaml(&raw)?;
        info!("Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a YAML document. An empty document yields
    /// the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, PipelineError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| PipelineError::Config(e.to_string()))
    }
}

/// Resolved file locations for one run date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub sources: PathBuf,
    pub output_dir: PathBuf,
}

impl Paths {
    /// Derive the standard layout under `base_dir`, applying overrides.
    pub fn resolve(base_dir: &Path, sources: Option<&Path>, config: &PipelineConfig) -> Self {
        let discovery_dir = base_dir.join("discovery");
        Self {
            sources: sources
                .map(Path::to_path_buf)
                .unwrap_or_else(|| discovery_dir.join("sources.csv")),
            output_dir: config
                .output_dir
                .clone()
                .unwrap_or_else(|| discovery_dir.join("output")),
        }
    }

    /// Manifest written by discovery and read by fetch.
    pub fn manifest(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(format!("articles_{date}.csv"))
    }

    /// JSON-lines content file written by fetch.
    pub fn content(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(format!("content_{date}.jsonl"))
    }
}
