//! In-memory fetcher for tests and offline hosts

use std::collections::HashMap;
use std::future::{Future, ready};

use url::Url;

use crate::{FetchError, ResourceFetcher, resolve_url};

/// Serves canned responses keyed by absolute URL
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    base_url: Option<Url>,
    responses: HashMap<String, (u16, String)>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            responses: HashMap::new(),
        }
    }

    /// Serve `body` with status 200
    pub fn insert(&mut self, url: &str, body: &str) -> Result<(), FetchError> {
        self.insert_with_status(url, 200, body)
    }

    pub fn insert_with_status(&mut self, url: &str, status: u16, body: &str) -> Result<(), FetchError> {
        let url = resolve_url(self.base_url.as_ref(), url)?;
        self.responses.insert(url.into(), (status, body.to_string()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl ResourceFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        ready(self.fetch_sync(url))
    }

    fn fetch_sync(&self, url: &str) -> Result<String, FetchError> {
        let url = resolve_url(self.base_url.as_ref(), url)?;
        match self.responses.get(url.as_str()) {
            Some((status, body)) if (200..300).contains(status) => Ok(body.clone()),
            Some((status, _)) => Err(FetchError::status(&url, *status)),
            None => Err(FetchError::status(&url, 404)),
        }
    }
}
