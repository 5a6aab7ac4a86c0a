//! Fetch job entry point.
//!
//! Reads `discovery/output/articles_<date>.csv`, downloads every eligible
//! URL and writes extracted articles to `discovery/output/content_<date>.jsonl`.

use clap::Parser;
use daily_news_scraper::cli::FetchCli;
use daily_news_scraper::utils::{ensure_writable_dir, init_tracing, run_date};
use daily_news_scraper::{Paths, PipelineConfig, SourceProfiles, fetch};
use std::error::Error;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let start_time = std::time::Instant::now();
    let args = FetchCli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = PipelineConfig::load(args.common.config.as_deref())?;
    let paths = Paths::resolve(&args.common.base_dir, None, &config);
    let date = run_date(args.common.date);
    info!(%date, manifest = %paths.manifest(date).display(), "fetch_articles starting up");

    if let Err(e) = ensure_writable_dir(&paths.output_dir).await {
        error!(
            path = %paths.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let profiles = SourceProfiles::builtin();
    let report = fetch::run_job(&paths, &config, &profiles, date).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        written = report.written,
        filtered = report.filtered,
        failed = report.failed,
        "Execution complete"
    );
    Ok(())
}
