//! Constants for the download module (timeouts, output naming).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP request timeout (5 minutes, covers slow image hosts).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Extension appended to every downloaded image, whatever its real format.
pub const IMAGE_EXTENSION: &str = "png";
