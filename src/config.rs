//! Search configuration: the parameters of one run, persisted beside the images.

use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::download::directory_name_for_query;

/// File written into the run directory once every page has been processed.
pub const CONFIG_FILE_NAME: &str = "search_config.json";

/// First results page searched by default.
pub const DEFAULT_START_PAGE: u32 = 0;

/// Number of results pages searched by default.
pub const DEFAULT_N_PAGES: u32 = 10;

/// Google domain queried by default.
pub const DEFAULT_GOOGLE_DOMAIN: &str = "google.com";

/// Google search type for image search.
pub const DEFAULT_TBM: &str = "isch";

/// Errors reading or writing `search_config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system error.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File that could not be read or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config could not be serialized.
    #[error("failed to serialize search config: {0}")]
    Serialize(#[source] serde_json::Error),

    /// File contents are not a valid search config.
    #[error("invalid search config in {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Parameters of a single run, exactly as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Text searched for.
    pub query: String,
    /// First results page (`ijn`) to request.
    pub start_page: u32,
    /// How many consecutive pages to request.
    pub n_pages: u32,
    /// Google domain the provider should use.
    #[serde(default = "default_google_domain")]
    pub google_domain: String,
    /// Google search type (`isch` for images).
    #[serde(default = "default_tbm")]
    pub tbm: String,
}

fn default_google_domain() -> String {
    DEFAULT_GOOGLE_DOMAIN.to_string()
}

fn default_tbm() -> String {
    DEFAULT_TBM.to_string()
}

impl SearchConfig {
    /// Config for `query` with every other field at its default.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            start_page: DEFAULT_START_PAGE,
            n_pages: DEFAULT_N_PAGES,
            google_domain: default_google_domain(),
            tbm: default_tbm(),
        }
    }

    /// Page numbers to search, in order: `start_page..start_page + n_pages`.
    #[must_use]
    pub fn pages(&self) -> Range<u32> {
        self.start_page..self.start_page.saturating_add(self.n_pages)
    }

    /// Run directory name: the query with spaces replaced by underscores.
    #[must_use]
    pub fn directory_name(&self) -> String {
        directory_name_for_query(&self.query)
    }

    /// Writes the config as JSON to `{directory}/search_config.json`.
    ///
    /// The file is created or truncated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization or the write fails.
    pub async fn write_to_dir(&self, directory: &Path) -> Result<PathBuf, ConfigError> {
        let path = directory.join(CONFIG_FILE_NAME);
        let json = serde_json::to_vec(self).map_err(ConfigError::Serialize)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "search config written");
        Ok(path)
    }

    /// Reads a config previously written by [`write_to_dir`](Self::write_to_dir).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
