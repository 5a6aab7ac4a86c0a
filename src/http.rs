//! Shared HTTP plumbing.
//!
//! Both jobs fetch one URL at a time through a single [`reqwest::Client`]. A
//! non-success status is reported as an error; there are no retries.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

/// Build the client used for every request in a job.
pub fn build_client(config: &PipelineConfig) -> Result<Client, PipelineError> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// GET `url` and return its body as text.
///
/// # Errors
///
/// Network failures map through `From<reqwest::Error>`, non-2xx statuses
/// through `From<StatusCode>`, so each stage gets its own error type.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn fetch_text<E>(client: &Client, url: &str) -> Result<String, E>
where
    E: From<reqwest::Error> + From<StatusCode>,
{
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(E::from(status));
    }
    let body = resp.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// GET `url` and return the raw body. Used for feeds, whose encoding is
/// declared inside the document.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn fetch_bytes<E>(client: &Client, url: &str) -> Result<Vec<u8>, E>
where
    E: From<reqwest::Error> + From<StatusCode>,
{
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(E::from(status));
    }
    let body = resp.bytes().await?;
    debug!(bytes = body.len(), "Fetched document");
    Ok(body.to_vec())
}
