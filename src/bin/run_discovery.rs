//! Discovery job entry point.
//!
//! Reads the source registry, polls every source and appends the discovered
//! article URLs to `discovery/output/articles_<date>.csv`.

use clap::Parser;
use daily_news_scraper::cli::DiscoveryCli;
use daily_news_scraper::utils::{ensure_writable_dir, init_tracing, run_date};
use daily_news_scraper::{Paths, PipelineConfig, discovery};
use std::error::Error;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let start_time = std::time::Instant::now();
    let args = DiscoveryCli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = PipelineConfig::load(args.common.config.as_deref())?;
    let paths = Paths::resolve(&args.common.base_dir, args.sources.as_deref(), &config);
    let date = run_date(args.common.date);
    info!(%date, sources = %paths.sources.display(), "run_discovery starting up");

    if let Err(e) = ensure_writable_dir(&paths.output_dir).await {
        error!(
            path = %paths.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let report = discovery::run_job(&paths, &config, date).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = report.articles.len(),
        failed_sources = report.sources_failed,
        skipped_sources = report.sources_skipped,
        "Execution complete"
    );
    Ok(())
}
