//! Error types for both pipeline stages.
//!
//! Errors are split by how far they are allowed to travel:
//!
//! - [`PipelineError`]: configuration and file-level failures. These abort a
//!   job because there is no meaningful partial progress without valid input.
//! - [`DiscoveryError`]: a single source failed to index. The discovery
//!   driver logs it and moves on to the next registry entry.
//! - [`FetchError`]: a single manifest row failed to download or extract.
//!   The fetch driver logs it and moves on to the next row.
//! - [`RenderError`]: the headless browser could not produce a DOM. Rendered
//!   rows degrade to empty fields instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal, job-level failures.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Why a single source produced no discovery records.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("Feed parsing error: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),

    #[error("Unknown source type: {0:?}")]
    UnknownType(String),
}

/// Why a single manifest row produced no content record.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("Extraction failed: {0}")]
    Extract(String),
}

/// Why a script-rendered fetch did not return a DOM.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No headless browser available")]
    Unavailable,

    #[error("Failed to create browser profile: {0}")]
    Profile(#[source] std::io::Error),

    #[error("Failed to run browser {browser}: {source}")]
    Spawn {
        browser: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Browser timed out after {0}s")]
    Timeout(u64),

    #[error("Browser exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
}

impl From<reqwest::StatusCode> for FetchError {
    fn from(status: reqwest::StatusCode) -> Self {
        FetchError::Status(status)
    }
}

impl From<reqwest::StatusCode> for DiscoveryError {
    fn from(status: reqwest::StatusCode) -> Self {
        DiscoveryError::Status(status)
    }
}
