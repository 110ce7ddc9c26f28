//! CLI entry point for the image downloader.

use anyhow::{Context, Result};
use clap::Parser;
use image_downloader_core::{
    HttpClient, ImageFetcher, LogConfig, Logger, SearchDriver, SerpApiClient,
};
use tracing::info;

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first so --help works without building anything
    let args = Args::parse();

    let logger = Logger::stdout(&LogConfig::from_env(args.quiet));
    let config = args.search_config();

    let client = HttpClient::new().context("failed to initialise HTTP client")?;

    // Missing SERPAPI_KEY fails here, before any request is sent
    let provider = SerpApiClient::from_env(client.clone(), &args.api_base_url)
        .context("cannot start image search")?;

    let fetcher = ImageFetcher::new(client, logger.clone());
    let driver = SearchDriver::new(Box::new(provider), fetcher, logger.clone())
        .with_progress(!args.no_progress && !args.quiet);

    let summary = driver
        .run(&config, &args.output_dir)
        .await
        .with_context(|| format!("image search for {:?} aborted", config.query))?;

    logger.in_scope(|| {
        info!(
            "Downloaded {} images ({} skipped) from {} pages ({} failed) into `{}`.",
            summary.downloads.saved,
            summary.downloads.skipped,
            summary.pages_searched,
            summary.pages_failed,
            summary.directory.display()
        );
    });

    Ok(())
}
