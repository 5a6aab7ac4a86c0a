//! Utility functions shared by both binaries.
//!
//! - Tracing initialisation
//! - Run-date resolution
//! - String truncation for logging
//! - File system validation for output directories

use chrono::{Local, NaiveDate};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use crate::error::PipelineError;

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Output goes to stdout with
/// RFC 3339 UTC timestamps.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

/// The date a job runs for: `explicit` when given, otherwise today in local
/// time.
pub fn run_date(explicit: Option<NaiveDate>) -> NaiveDate {
    explicit.unwrap_or_else(|| Local::now().date_naive())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes and suffixed with the number of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;

    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"")
        .await
        .map_err(|e| PipelineError::io(&probe_path, e))?;
    let _ = fs::remove_file(&probe_path).await;

    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        // 'é' is two bytes; cutting at 1 would split it.
        let result = truncate_for_log("éé", 1);
        assert_eq!(result, "…(+4 bytes)");
    }

    #[test]
    fn test_run_date_explicit() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(run_date(Some(date)), date);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("discovery").join("output");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }
}
