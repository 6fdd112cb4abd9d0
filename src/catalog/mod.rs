//! Catalog access and the download pipeline
//!
//! The [`Catalog`] struct and its methods are organized by domain:
//! - [`artists`] - Artist list, artist pages and lookup by name
//! - [`songs`] - Per-artist song listings aggregated across site pages
//! - [`variants`] - Audio variants advertised on a song detail page
//! - [`download`] - Idempotent file retrieval and song/artist downloads
//!
//! Every read goes through the shared [`CatalogCache`]; every page fetch goes
//! through [`fetch_with_retry`].

mod artists;
mod download;
mod songs;
mod variants;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use download::{ArtistDownloadReport, SongOutcome};
pub use songs::page_url;
pub use variants::{AudioVariantMap, classify_audio_link};

use crate::cache::CatalogCache;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::retry::fetch_with_retry;
use std::sync::Arc;

/// Entry point for browsing the catalog and downloading songs
///
/// Cheap to clone; all fields are Arc-wrapped. The fetcher and cache are
/// injected at construction so several catalogs (or tests) can share or isolate
/// them as needed.
#[derive(Clone)]
pub struct Catalog {
    /// Network primitive for pages and audio bodies
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// Memoization shared by every read operation
    pub(crate) cache: Arc<CatalogCache>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
}

impl Catalog {
    /// Create a catalog talking to the configured site over HTTP
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate or the HTTP client cannot
    /// be built.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Create a catalog with a custom fetcher and a fresh cache
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(CatalogCache::new(config.cache.ttl, config.cache.capacity));
        Ok(Self::from_parts(Arc::new(config), fetcher, cache))
    }

    /// Assemble a catalog from already constructed parts
    ///
    /// The configuration is assumed to be valid.
    pub fn from_parts(
        config: Arc<Config>,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            config,
        }
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The cache backing this catalog
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Fetch a catalog page, retrying transient failures
    pub(crate) async fn fetch_page(&self, url: &str) -> Result<String> {
        fetch_with_retry(&self.config.retry, || self.fetcher.fetch(url)).await
    }
}
