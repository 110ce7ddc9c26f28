//! Single-image fetcher: one GET, stream a 200 body to disk, log the outcome.
//!
//! [`ImageFetcher::fetch`] never returns an error. Every failure (bad URL,
//! non-200 status, transport error, disk error) is logged once through the
//! injected [`Logger`] and reported back as [`FetchOutcome::Skipped`].

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::StatusCode;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, instrument};
use url::Url;

use super::client::HttpClient;
use super::error::DownloadError;
use crate::logging::Logger;

/// Result of a single [`ImageFetcher::fetch`] call.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The body was written to `path`.
    Saved {
        /// Destination file.
        path: PathBuf,
        /// Bytes written after content decoding.
        bytes: u64,
    },
    /// Nothing was written; the error has already been logged.
    Skipped(DownloadError),
}

impl FetchOutcome {
    /// Returns true when a file was written.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Downloads images one at a time.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: HttpClient,
    logger: Logger,
}

impl ImageFetcher {
    /// Creates a fetcher sharing `client` and logging through `logger`.
    #[must_use]
    pub fn new(client: HttpClient, logger: Logger) -> Self {
        Self { client, logger }
    }

    /// Downloads `url` into `destination`, creating or truncating the file.
    ///
    /// Only a 200 response is saved. The body is decoded according to its
    /// `Content-Encoding` before it reaches disk.
    pub async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome {
        self.logger
            .scope(async {
                match self.download(url, destination).await {
                    Ok(bytes) => {
                        info!(
                            bytes,
                            "Image `{}` successfully downloaded.",
                            destination.display()
                        );
                        FetchOutcome::Saved {
                            path: destination.to_path_buf(),
                            bytes,
                        }
                    }
                    Err(err) => {
                        log_failure(&err, destination);
                        FetchOutcome::Skipped(err)
                    }
                }
            })
            .await
    }

    #[instrument(level = "debug", skip(self, destination), fields(url = %url))]
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        let parsed = parse_image_url(url)?;

        let response = self
            .client
            .inner()
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let result = stream_to_file(&mut file, response, url, destination).await;
        if result.is_err() {
            debug!(path = %destination.display(), "removing partial file after error");
            let _ = tokio::fs::remove_file(destination).await;
        }
        result
    }
}

fn parse_image_url(url: &str) -> Result<Url, DownloadError> {
    let parsed = Url::parse(url).map_err(|e| DownloadError::invalid_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(DownloadError::invalid_url(
            url,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn log_failure(err: &DownloadError, destination: &Path) {
    let filename = destination.display();
    match err {
        DownloadError::InvalidUrl { .. } => {
            error!("Could not download image {filename}. An invalid URL was provided. {err}.");
        }
        DownloadError::HttpStatus { status, .. } => {
            error!("Could not download image {filename}. Received {status} status code.");
        }
        _ => error!("Could not download image {filename}. {err}."),
    }
}

/// Streams the response body to `file`, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
