//! Error types for the search module.

use thiserror::Error;

/// Errors raised while asking the provider for one page of results.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The API credential is not set.
    #[error("SerpApi key is not set. Set the {var} environment variable and re-try the search.")]
    MissingApiKey {
        /// Environment variable that should hold the key.
        var: &'static str,
    },

    /// The configured provider endpoint is not a valid base URL.
    #[error("invalid search endpoint {url}: {reason}")]
    InvalidEndpoint {
        /// The rejected base URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The provider answered, but not with the expected result list.
    #[error("malformed search response for page {page}: {reason}")]
    MalformedResponse {
        /// Page that was requested.
        page: u32,
        /// What was wrong with the body.
        reason: String,
    },

    /// Transport failure talking to the provider.
    #[error("network error searching page {page}: {source}")]
    Network {
        /// Page that was requested.
        page: u32,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The provider did not answer in time.
    #[error("timeout searching page {page}")]
    Timeout {
        /// Page that was requested.
        page: u32,
    },

    /// The provider answered with a non-success status.
    #[error(
        "search provider returned HTTP {status} for page {page}{}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    HttpStatus {
        /// Page that was requested.
        page: u32,
        /// The HTTP status code.
        status: u16,
        /// Error text from the provider body, when it sent one.
        message: Option<String>,
    },
}

impl SearchError {
    /// Creates a malformed-response error.
    pub fn malformed(page: u32, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            page,
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error, promoting timeouts.
    #[must_use]
    pub fn network(page: u32, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { page }
        } else {
            Self::Network { page, source }
        }
    }

    /// Whether this error must end the run.
    ///
    /// Configuration problems, unreadable provider responses and rejected
    /// requests (bad key, exhausted quota) are fatal. Transport failures and
    /// transient statuses only cost the current page.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::MissingApiKey { .. }
            | Self::InvalidEndpoint { .. }
            | Self::MalformedResponse { .. } => true,
            Self::HttpStatus { status, .. } => !is_transient_status(*status),
            Self::Network { .. } | Self::Timeout { .. } => false,
        }
    }
}

/// Statuses worth moving past: server errors, request timeout, rate limiting.
fn is_transient_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}
