//! Search provider abstraction and the records it produces.

use async_trait::async_trait;
use serde::Deserialize;

use super::error::SearchError;
use crate::config::SearchConfig;

/// One image result returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    /// Full-size image URL.
    #[serde(rename = "original")]
    pub original_image_url: String,
    /// Result title; becomes the file stem.
    pub title: String,
}

/// Parameters for one page of image results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Text searched for.
    pub query: String,
    /// Zero-based results page (`ijn`).
    pub page_number: u32,
    /// Google domain to search on.
    pub google_domain: String,
    /// Google search type (`isch` for images).
    pub tbm: String,
}

impl SearchRequest {
    /// Request for `page_number` using the query, domain and mode of `config`.
    #[must_use]
    pub fn for_page(config: &SearchConfig, page_number: u32) -> Self {
        Self {
            query: config.query.clone(),
            page_number,
            google_domain: config.google_domain.clone(),
            tbm: config.tbm.clone(),
        }
    }
}

/// A backend that turns a [`SearchRequest`] into image results.
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetches one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`]; see [`SearchError::is_fatal`] for which
    /// failures end a run.
    async fn search_images(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, SearchError>;
}
