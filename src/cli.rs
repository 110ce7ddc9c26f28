//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;

use image_downloader_core::SearchConfig;
use image_downloader_core::config::{
    DEFAULT_GOOGLE_DOMAIN, DEFAULT_N_PAGES, DEFAULT_START_PAGE, DEFAULT_TBM,
};
use image_downloader_core::search::serpapi::DEFAULT_BASE_URL;

/// Search Google Images through SerpApi and download every result.
///
/// Images land in a directory named after the query (spaces become
/// underscores), next to a search_config.json describing the run.
/// Requires the SERPAPI_KEY environment variable.
#[derive(Parser, Debug)]
#[command(name = "image-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Search query
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub query: String,

    /// First page to fetch results from
    #[arg(long = "start_page", visible_alias = "start-page", default_value_t = DEFAULT_START_PAGE)]
    pub start_page: u32,

    /// Number of pages to search through
    #[arg(long = "n_pages", visible_alias = "n-pages", default_value_t = DEFAULT_N_PAGES)]
    pub n_pages: u32,

    /// Google domain to search on
    #[arg(long = "google_domain", visible_alias = "google-domain", default_value = DEFAULT_GOOGLE_DOMAIN)]
    pub google_domain: String,

    /// Google search type (isch = image search)
    #[arg(long, default_value = DEFAULT_TBM)]
    pub tbm: String,

    /// Base directory for the query directory
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Only print errors
    #[arg(long)]
    pub quiet: bool,

    /// Hide the page progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// SerpApi-compatible base URL
    #[arg(long, hide = true, default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,
}

impl Args {
    /// The search configuration recorded for this run.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            query: self.query.clone(),
            start_page: self.start_page,
            n_pages: self.n_pages,
            google_domain: self.google_domain.clone(),
            tbm: self.tbm.clone(),
        }
    }
}
