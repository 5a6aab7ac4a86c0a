//! Best-effort script rendering for sources behind a client-side gate.
//!
//! Some sites only serve article markup after JavaScript has run (consent
//! walls, hydration). For those the fetch job asks a [`Renderer`] for the
//! DOM instead of downloading the raw page.
//!
//! [`HeadlessBrowser`] drives a Chromium-family binary in `--dump-dom` mode.
//! One browser profile directory is created when the session is launched and
//! shared by every render in the job, so a consent cookie set on the first
//! page is reused for the rest. The directory is removed when the session
//! is dropped.
//!
//! Rendering is attempted once per URL, bounded by a timeout. Callers treat
//! any [`RenderError`] as "no markup" rather than a failed row.

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::utils::truncate_for_log;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Browser binaries searched on `PATH` when none is configured.
const BROWSER_CANDIDATES: &[&str] = &["chromium", "chromium-browser", "google-chrome"];

/// Milliseconds of virtual time scripts get before the DOM is dumped.
const VIRTUAL_TIME_BUDGET_MS: u64 = 10_000;

/// Something that can load a URL, run its scripts and return the final DOM.
pub trait Renderer {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// A headless Chromium session shared across a job.
#[derive(Debug)]
pub struct HeadlessBrowser {
    browser: PathBuf,
    profile: TempDir,
    timeout: Duration,
}

impl HeadlessBrowser {
    /// Start a rendering session.
    ///
    /// # Errors
    ///
    /// [`RenderError::Unavailable`] when no browser binary can be found,
    /// [`RenderError::Profile`] when the profile directory cannot be created.
    #[instrument(level = "info", skip_all)]
    pub fn launch(config: &RendererConfig) -> Result<Self, RenderError> {
        let browser = match &config.browser {
            Some(path) => path.clone(),
            None => locate_browser().ok_or(RenderError::Unavailable)?,
        };
        let profile = tempfile::Builder::new()
            .prefix("news-render-")
            .tempdir()
            .map_err(RenderError::Profile)?;

        info!(
            browser = %browser.display(),
            profile = %profile.path().display(),
            timeout_secs = config.timeout_secs,
            "Rendering session ready"
        );
        Ok(Self {
            browser,
            profile,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.browser);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg(format!("--user-data-dir={}", self.profile.path().display()))
            .arg(format!("--virtual-time-budget={VIRTUAL_TIME_BUDGET_MS}"))
            .arg("--dump-dom")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Renderer for HeadlessBrowser {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let browser = self.browser.display().to_string();
        let child = self
            .command(url)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                browser: browser.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| RenderError::Spawn { browser, source })?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Browser did not finish in time");
                return Err(RenderError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            return Err(RenderError::Exit {
                status: output.status.to_string(),
                stderr: truncate_for_log(String::from_utf8_lossy(&output.stderr).trim(), 300),
            });
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = dom.len(), "Rendered page");
        Ok(dom)
    }
}

/// First browser candidate found on `PATH`.
pub fn locate_browser() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in(std::env::split_paths(&path), BROWSER_CANDIDATES)
}

fn find_in(dirs: impl IntoIterator<Item = PathBuf>, names: &[&str]) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = dirs.into_iter().collect();
    names
        .iter()
        .flat_map(|name| dirs.iter().map(move |dir| dir.join(name)))
        .find(|candidate| candidate.is_file())
}
