//! SerpApi Google Images provider.
//!
//! Calls `GET {base}/search.json` with `api_key`, `engine=google`, `ijn`,
//! `google_domain`, `tbm` and `q`, and reads the `images_results` array.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::error::SearchError;
use super::provider::{ImageSearchProvider, SearchRequest, SearchResult};
use crate::download::HttpClient;

/// Environment variable holding the SerpApi key.
pub const API_KEY_ENV: &str = "SERPAPI_KEY";

/// Default SerpApi base URL.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

const SEARCH_PATH: &str = "search.json";
const ENGINE: &str = "google";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    images_results: Option<Vec<SearchResult>>,
    error: Option<String>,
}

/// Reads the API key through `lookup` (normally the process environment).
///
/// A missing or blank value is a [`SearchError::MissingApiKey`].
///
/// # Errors
///
/// Returns [`SearchError::MissingApiKey`] when no usable key is found.
pub fn api_key_from<F>(lookup: F) -> Result<String, SearchError>
where
    F: FnOnce(&str) -> Option<String>,
{
    lookup(API_KEY_ENV)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(SearchError::MissingApiKey { var: API_KEY_ENV })
}

/// Image search through SerpApi's Google engine.
pub struct SerpApiClient {
    client: HttpClient,
    endpoint: Url,
    api_key: String,
}

impl SerpApiClient {
    /// Creates a client for the public SerpApi endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidEndpoint`] if the built-in URL fails to parse.
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client for a custom base URL (another deployment, or wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidEndpoint`] if `base_url` is not an http(s) URL.
    pub fn with_base_url(
        client: HttpClient,
        api_key: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            client,
            endpoint: search_endpoint(base_url)?,
            api_key: api_key.into(),
        })
    }

    /// Creates a client with the key read from `SERPAPI_KEY`.
    ///
    /// Fails before any request is made when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingApiKey`] or [`SearchError::InvalidEndpoint`].
    pub fn from_env(client: HttpClient, base_url: &str) -> Result<Self, SearchError> {
        let api_key = api_key_from(|name| std::env::var(name).ok())?;
        Self::with_base_url(client, api_key, base_url)
    }

    fn request_url(&self, request: &SearchRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("engine", ENGINE)
            .append_pair("ijn", &request.page_number.to_string())
            .append_pair("google_domain", &request.google_domain)
            .append_pair("tbm", &request.tbm)
            .append_pair("q", &request.query);
        url
    }
}

impl std::fmt::Debug for SerpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

fn search_endpoint(base_url: &str) -> Result<Url, SearchError> {
    let invalid = |reason: String| SearchError::InvalidEndpoint {
        url: base_url.to_string(),
        reason,
    };
    let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(SEARCH_PATH).map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl ImageSearchProvider for SerpApiClient {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    #[instrument(level = "debug", skip(self, request), fields(page = request.page_number, q = %request.query))]
    async fn search_images(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, SearchError> {
        let page = request.page_number;
        debug!(endpoint = %self.endpoint, "calling SerpApi");

        let response = self
            .client
            .inner()
            .get(self.request_url(request))
            .send()
            .await
            .map_err(|e| SearchError::network(page, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::network(page, e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<SerpApiResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error);
            debug!(status = status.as_u16(), ?message, "SerpApi error status");
            return Err(SearchError::HttpStatus {
                page,
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SerpApiResponse = serde_json::from_slice(&body)
            .map_err(|e| SearchError::malformed(page, format!("invalid JSON body: {e}")))?;

        match parsed.images_results {
            Some(results) => {
                debug!(results = results.len(), "SerpApi page parsed");
                Ok(results)
            }
            None => Err(SearchError::malformed(
                page,
                match parsed.error {
                    Some(provider_error) => {
                        format!("missing `images_results` field (provider error: {provider_error})")
                    }
                    None => "missing `images_results` field".to_string(),
                },
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    fn request(page_number: u32) -> SearchRequest {
        SearchRequest {
            query: "pizza slice".to_string(),
            page_number,
            google_domain: "google.com".to_string(),
            tbm: "isch".to_string(),
        }
    }

    #[test]
    fn test_api_key_from_present() {
        let key = api_key_from(|name| {
            assert_eq!(name, API_KEY_ENV);
            Some(" secret ".to_string())
        });
        assert_eq!(key.unwrap(), "secret");
    }

    #[test]
    fn test_api_key_from_absent_or_blank_is_missing() {
        assert!(matches!(
            api_key_from(|_| None),
            Err(SearchError::MissingApiKey { var: API_KEY_ENV })
        ));
        assert!(matches!(
            api_key_from(|_| Some("   ".to_string())),
            Err(SearchError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn test_search_endpoint_appends_path() {
        assert_eq!(
            search_endpoint("https://serpapi.com").unwrap().as_str(),
            "https://serpapi.com/search.json"
        );
        assert_eq!(
            search_endpoint("http://127.0.0.1:8080/proxy").unwrap().as_str(),
            "http://127.0.0.1:8080/proxy/search.json"
        );
    }

    #[test]
    fn test_search_endpoint_rejects_bad_urls() {
        assert!(matches!(
            search_endpoint("not a url"),
            Err(SearchError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            search_endpoint("file:///tmp"),
            Err(SearchError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_request_url_carries_all_parameters() {
        let client = SerpApiClient::new(HttpClient::new().unwrap(), "k3y").unwrap();
        let url = client.request_url(&request(4));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("api_key".to_string(), "k3y".to_string()),
                ("engine".to_string(), "google".to_string()),
                ("ijn".to_string(), "4".to_string()),
                ("google_domain".to_string(), "google.com".to_string()),
                ("tbm".to_string(), "isch".to_string()),
                ("q".to_string(), "pizza slice".to_string()),
            ]
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = SerpApiClient::new(HttpClient::new().unwrap(), "super-secret").unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn test_search_images_returns_results() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("ijn", "1"))
            .and(query_param("q", "pizza slice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_metadata": {"status": "Success"},
                "images_results": [
                    {"original": "https://img.example/a.jpg", "title": "A", "position": 1},
                    {"original": "https://img.example/b.jpg", "title": "B", "position": 2}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            SerpApiClient::with_base_url(HttpClient::new().unwrap(), "key", &mock_server.uri())
                .unwrap();
        let results = client.search_images(&request(1)).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original_image_url, "https://img.example/a.jpg");
        assert_eq!(results[1].title, "B");
    }

    #[tokio::test]
    async fn test_search_images_missing_field_is_fatal() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Google hasn't returned any results for this query."
            })))
            .mount(&mock_server)
            .await;

        let client =
            SerpApiClient::with_base_url(HttpClient::new().unwrap(), "key", &mock_server.uri())
                .unwrap();
        let err = client.search_images(&request(0)).await.unwrap_err();

        assert!(err.is_fatal());
        let msg = err.to_string();
        assert!(msg.contains("images_results"), "got: {msg}");
        assert!(msg.contains("hasn't returned any results"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_search_images_rejected_key_is_fatal() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid API key."})),
            )
            .mount(&mock_server)
            .await;

        let client =
            SerpApiClient::with_base_url(HttpClient::new().unwrap(), "bad", &mock_server.uri())
                .unwrap();
        let err = client.search_images(&request(0)).await.unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(
            err,
            SearchError::HttpStatus { status: 401, message: Some(ref m), .. } if m == "Invalid API key."
        ));
    }

    #[tokio::test]
    async fn test_search_images_server_error_is_recoverable() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&mock_server)
            .await;

        let client =
            SerpApiClient::with_base_url(HttpClient::new().unwrap(), "key", &mock_server.uri())
                .unwrap();
        let err = client.search_images(&request(2)).await.unwrap_err();

        assert!(!err.is_fatal());
        assert!(matches!(
            err,
            SearchError::HttpStatus { page: 2, status: 503, message: None }
        ));
    }
}
