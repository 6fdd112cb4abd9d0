//! Document fetching over HTTP
//!
//! The [`Fetcher`] trait is the only network primitive the catalog depends on.
//! [`HttpFetcher`] implements it with `reqwest`; tests substitute their own
//! implementations or point an `HttpFetcher` at a mock server.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Network primitive used by the catalog and the file retriever
///
/// Implementations must not cache or retry; both concerns live above this layer.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page and return its body as text
    ///
    /// # Errors
    ///
    /// Fails on connection errors, timeouts and non-success statuses.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Stream a binary body into `dest`, creating or truncating it
    ///
    /// Returns the number of bytes written.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// `reqwest`-backed fetcher
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher from the HTTP and site sections of the configuration
    ///
    /// The per-request timeout bounds connecting and reading catalog pages.
    /// Audio downloads are bounded separately by the file retriever.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.http.request_timeout)
            .user_agent(config.site.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            request_timeout: config.http.request_timeout,
        })
    }

    /// Wrap an existing client (shared connection pool)
    pub fn with_client(client: reqwest::Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching page");
        let body = self
            .get(url, Some(self.request_timeout))
            .await?
            .text()
            .await?;
        debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!(url, path = %dest.display(), "Streaming file");
        let mut response = self.get(url, None).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}
