//! # Daily News Scraper
//!
//! A two-stage batch pipeline for collecting news articles.
//!
//! 1. **Discovery** (`run_discovery`): poll every source in the registry
//!    (RSS feeds and HTML listing pages) and append candidate article URLs to
//!    a dated manifest CSV.
//! 2. **Fetch** (`fetch_articles`): download every manifest URL, extract
//!    title, lead, body, author and tags with a per-source extractor, and
//!    write one JSON object per line to a dated content file.
//!
//! The manifest file is the only interface between the two stages. Both
//! stages run one request at a time and never abort on a single failed
//! source or row; only configuration and output failures are fatal.
//!
//! ## Usage
//!
//! ```sh
//! run_discovery --base-dir /srv/news
//! fetch_articles --base-dir /srv/news
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod http;
pub mod manifest;
pub mod models;
pub mod registry;
pub mod render;
pub mod utils;

pub use config::{Paths, PipelineConfig};
pub use error::{DiscoveryError, FetchError, PipelineError, RenderError};
pub use fetch::SourceProfiles;
pub use models::{ArticleFields, ContentRecord, DiscoveredArticle, FetchType, SourceEntry};
