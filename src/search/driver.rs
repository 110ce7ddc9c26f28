//! Page loop: search each page, download every result, save the config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, error, info};

use super::error::SearchError;
use super::provider::{ImageSearchProvider, SearchRequest, SearchResult};
use crate::config::{ConfigError, SearchConfig};
use crate::download::{FetchOutcome, ImageFetcher, image_path};
use crate::logging::Logger;

/// Errors that end a run early.
#[derive(Debug, Error)]
pub enum RunError {
    /// A fatal search failure (missing key, malformed response).
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The config file could not be written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Saved/skipped counts for a batch of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadTally {
    /// Images written to disk.
    pub saved: usize,
    /// Images skipped after a logged failure.
    pub skipped: usize,
}

impl DownloadTally {
    fn record(&mut self, outcome: &FetchOutcome) {
        if outcome.is_saved() {
            self.saved += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Totals for a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Directory the images and config were written to.
    pub directory: PathBuf,
    /// Path of the written `search_config.json`.
    pub config_path: PathBuf,
    /// Pages for which the provider returned results.
    pub pages_searched: u32,
    /// Pages skipped after a recoverable search failure.
    pub pages_failed: u32,
    /// Per-image totals across all pages.
    pub downloads: DownloadTally,
}

/// Drives the search → download → persist pipeline.
pub struct SearchDriver {
    provider: Box<dyn ImageSearchProvider>,
    fetcher: ImageFetcher,
    logger: Logger,
    show_progress: bool,
}

impl SearchDriver {
    /// Creates a driver with the progress bar enabled.
    #[must_use]
    pub fn new(provider: Box<dyn ImageSearchProvider>, fetcher: ImageFetcher, logger: Logger) -> Self {
        Self {
            provider,
            fetcher,
            logger,
            show_progress: true,
        }
    }

    /// Enables or disables the page progress bar.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Requests one page of results for `config`.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`SearchError`] unchanged.
    pub async fn search(
        &self,
        config: &SearchConfig,
        page_number: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let request = SearchRequest::for_page(config, page_number);
        debug!(provider = self.provider.name(), page = page_number, "searching");
        self.provider.search_images(&request).await
    }

    /// Downloads each result, in order, to `{directory}/{title}.png`.
    pub async fn download_search_results(
        &self,
        results: &[SearchResult],
        directory: &Path,
    ) -> DownloadTally {
        let mut tally = DownloadTally::default();
        for result in results {
            let destination = image_path(directory, &result.title);
            let outcome = self
                .fetcher
                .fetch(&result.original_image_url, &destination)
                .await;
            tally.record(&outcome);
        }
        tally
    }

    /// Runs every page of `config`, writing into `{output_root}/{query_dir}`.
    ///
    /// The run directory is created before the first search. Recoverable
    /// page failures are logged and skipped; a fatal search error stops the
    /// run before the config is written.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for fatal search errors, directory creation
    /// failures, and config write failures.
    pub async fn run(
        &self,
        config: &SearchConfig,
        output_root: &Path,
    ) -> Result<RunSummary, RunError> {
        self.logger.scope(self.run_pages(config, output_root)).await
    }

    async fn run_pages(
        &self,
        config: &SearchConfig,
        output_root: &Path,
    ) -> Result<RunSummary, RunError> {
        let directory = output_root.join(config.directory_name());
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|source| RunError::CreateDir {
                path: directory.clone(),
                source,
            })?;

        let pages = config.pages();
        let progress = self.progress_bar(pages.len() as u64, &config.query);
        let mut pages_searched = 0;
        let mut pages_failed = 0;
        let mut downloads = DownloadTally::default();

        for page_number in pages {
            match self.search(config, page_number).await {
                Ok(results) => {
                    info!("Found {} images on page {page_number}.", results.len());
                    let tally = self.download_search_results(&results, &directory).await;
                    downloads.saved += tally.saved;
                    downloads.skipped += tally.skipped;
                    pages_searched += 1;
                }
                Err(err) if err.is_fatal() => {
                    progress.abandon();
                    return Err(err.into());
                }
                Err(err) => {
                    error!("Could not search page {page_number}. {err}.");
                    pages_failed += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        let config_path = config.write_to_dir(&directory).await?;
        info!("Search config saved to `{}`.", config_path.display());

        Ok(RunSummary {
            directory,
            config_path,
            pages_searched,
            pages_failed,
            downloads,
        })
    }

    fn progress_bar(&self, pages: u64, query: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(pages);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len} pages ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(query.to_string());
        bar.enable_steady_tick(Duration::from_millis(200));
        bar
    }
}

impl std::fmt::Debug for SearchDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDriver")
            .field("provider", &self.provider.name())
            .field("show_progress", &self.show_progress)
            .finish_non_exhaustive()
    }
}
