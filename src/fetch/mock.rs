//! Mock fetcher for testing

use super::Fetcher;
use crate::{Error, Result};
use std::collections::HashMap;

/// A fetcher that serves canned bodies from memory
///
/// URLs without a registered body answer like a server returning 404.
#[derive(Clone, Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl MockFetcher {
    /// Create a fetcher with no registered responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body served for `url`
    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch("HTTP/1.1 404 Not Found".to_string()))
    }
}
