//! Command-line interface definitions for both batch programs.
//!
//! Neither program requires arguments. Every option can also be supplied via
//! an environment variable.

use chrono::NaiveDate;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by `run_discovery` and `fetch_articles`.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Root directory holding `discovery/sources.csv` and `discovery/output/`
    #[arg(short, long, env = "NEWS_BASE_DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Run date (YYYY-MM-DD) used to name the manifest and content files; defaults to today
    #[arg(short, long, env = "NEWS_RUN_DATE")]
    pub date: Option<NaiveDate>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Poll every configured source and append discovered URLs to today's manifest.
///
/// # Examples
///
/// ```sh
/// run_discovery
/// run_discovery --base-dir /srv/news --date 2024-01-06
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct DiscoveryCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Source registry CSV; defaults to `<base-dir>/discovery/sources.csv`
    #[arg(short, long, env = "NEWS_SOURCES")]
    pub sources: Option<PathBuf>,
}

/// Download every manifest URL and write extracted articles as JSON lines.
///
/// # Examples
///
/// ```sh
/// fetch_articles
/// fetch_articles -b /srv/news -d 2024-01-06
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct FetchCli {
    #[command(flatten)]
    pub common: CommonArgs,
}
