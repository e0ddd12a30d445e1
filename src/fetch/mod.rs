//! Fetching content from URLs
//!
//! The store never talks to the network directly; it goes through a
//! [`Fetcher`], so imports can be driven by an HTTP client in production and
//! by canned responses in tests.

#[cfg(feature = "remote")]
mod http;
mod mock;

#[cfg(feature = "remote")]
pub use http::HttpFetcher;
pub use mock::MockFetcher;

use crate::Result;

/// Trait for retrieving the body behind a URL
pub trait Fetcher {
    /// GET `url` and return the response body
    ///
    /// Any status code of 300 or above is an error.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}
