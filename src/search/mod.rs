//! Image search: provider seam, SerpApi client, and the page-by-page driver.
//!
//! The driver asks an [`ImageSearchProvider`] for one page at a time and
//! hands every [`SearchResult`] to the [`ImageFetcher`](crate::download::ImageFetcher).
//! [`SearchError::is_fatal`] decides whether a failed page ends the run.

mod driver;
mod error;
mod provider;
pub mod serpapi;

pub use driver::{DownloadTally, RunError, RunSummary, SearchDriver};
pub use error::SearchError;
pub use provider::{ImageSearchProvider, SearchRequest, SearchResult};
pub use serpapi::{API_KEY_ENV, SerpApiClient, api_key_from};
