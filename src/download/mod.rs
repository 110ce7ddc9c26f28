//! Image download: HTTP client, streaming fetcher, output naming.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use image_downloader_core::download::{HttpClient, ImageFetcher};
//! use image_downloader_core::{LogConfig, Logger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = Logger::stdout(&LogConfig::default());
//! let fetcher = ImageFetcher::new(HttpClient::new()?, logger);
//! let outcome = fetcher
//!     .fetch("https://example.com/pizza.jpg", Path::new("pizza/Pizza.png"))
//!     .await;
//! println!("saved: {}", outcome.is_saved());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod fetcher;
mod filename;

pub use client::HttpClient;
pub use error::DownloadError;
pub use fetcher::{FetchOutcome, ImageFetcher};
pub use filename::{directory_name_for_query, image_path};

// Note: no module-local Result alias; use `Result<T, DownloadError>` explicitly.
