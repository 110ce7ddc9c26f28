//! Image Downloader Core Library
//!
//! Searches an image engine for a text query, page by page, downloads every
//! result into a directory named after the query, and records the search
//! configuration beside the images.
//!
//! # Architecture
//!
//! - [`search`] - provider seam, SerpApi client, page driver
//! - [`download`] - HTTP client and single-image fetcher
//! - [`config`] - the persisted search configuration
//! - [`logging`] - injected info/error console sinks

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod logging;
pub mod search;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{CONFIG_FILE_NAME, ConfigError, SearchConfig};
pub use download::{DownloadError, FetchOutcome, HttpClient, ImageFetcher};
pub use logging::{LogConfig, Logger};
pub use search::{
    DownloadTally, ImageSearchProvider, RunError, RunSummary, SearchDriver, SearchError,
    SearchRequest, SearchResult, SerpApiClient,
};
