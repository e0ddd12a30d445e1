//! HTTP fetcher backed by reqwest's blocking client

use super::Fetcher;
use crate::{Error, Result};
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Fetches URLs over HTTP(S), one request at a time
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gifbox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to build client: {}", e)))?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(Error::Fetch(format!("{:?} {}", response.version(), status)));
        }

        let body = response
            .bytes()
            .map_err(|e| Error::Http(format!("Failed to read body: {}", e)))?;
        Ok(body.to_vec())
    }
}
