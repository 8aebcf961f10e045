//! HTTP fetcher
//!
//! Blocking reqwest client; the async variant runs the same request on
//! smol's blocking thread pool.

use std::future::Future;

use reqwest::blocking::Client;
use url::Url;

use crate::{FetchError, FetchOptions, ResourceFetcher, resolve_url};

/// Fetches resources over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Option<Url>,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&options.user_agent)
            .timeout(options.timeout)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: options.base_url,
        })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Absolute URL a request for `url` goes to
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        resolve_url(self.base_url.as_ref(), url)
    }
}

fn execute(client: &Client, url: Url) -> Result<String, FetchError> {
    tracing::debug!("Fetching from network: {}", url);
    let request_error = |e: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = client.get(url.clone()).send().map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        tracing::warn!("{} answered {}", url, status);
        return Err(FetchError::status(&url, status.as_u16()));
    }
    response.text().map_err(request_error)
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        let resolved = self.resolve(url);
        let client = self.client.clone();
        async move {
            let url = resolved?;
            smol::unblock(move || execute(&client, url)).await
        }
    }

    fn fetch_sync(&self, url: &str) -> Result<String, FetchError> {
        execute(&self.client, self.resolve(url)?)
    }
}
