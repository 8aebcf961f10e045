//! mimic Networking
//!
//! Resource fetch shim for link, script and style handling: fetch the text
//! behind a URL, either asynchronously or blocking the caller.

mod http;
mod memory;

use std::future::Future;
use std::time::Duration;

pub use http::HttpFetcher;
pub use memory::StaticFetcher;
pub use url::Url;

/// Fetch failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("Failed to perform request to \"{url}\". Status {status} {status_text}.")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },

    /// Transport-level failure (DNS, connect, TLS, body decoding)
    #[error("Failed to perform request to \"{url}\". {message}")]
    Request { url: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub(crate) fn status(url: &Url, status: u16) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self::Status {
            url: url.to_string(),
            status,
            status_text,
        }
    }
}

/// Text resource source
pub trait ResourceFetcher {
    /// Fetch without blocking the caller
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Fetch, blocking until the body is read
    fn fetch_sync(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Relative URLs are resolved against this
    pub base_url: Option<Url>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: format!("mimic/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Resolve `url` against an optional base
pub fn resolve_url(base: Option<&Url>, url: &str) -> Result<Url, FetchError> {
    let resolved = match base {
        Some(base) => base.join(url),
        None => Url::parse(url),
    };
    resolved.map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))
}
