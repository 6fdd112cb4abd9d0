//! Configuration types for musicfa-dl

use crate::error::{Error, Result};
use crate::types::QualityPreference;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Source site settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Home page carrying the artist list (default: "https://music-fa.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for catalog pages (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Listing pages of one artist fetched at the same time (default: 4)
    #[serde(default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            max_concurrent_pages: default_max_concurrent_pages(),
        }
    }
}

/// Audio download settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Where audio files are stored (default: "downloaded_audios")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Upper bound for retrieving one audio file (default: 300 seconds)
    ///
    /// Audio bodies are not covered by the per-request timeout; a retrieval
    /// exceeding this budget is abandoned and reported as failed.
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download_timeout: Duration,

    /// Upper bound for delivering one song to a session, all its tracks
    /// included (default: 600 seconds)
    #[serde(default = "default_delivery_timeout", with = "duration_serde")]
    pub delivery_timeout: Duration,

    /// Quality used when the user does not choose one (default: "any")
    #[serde(default)]
    pub default_quality: QualityPreference,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            download_timeout: default_download_timeout(),
            delivery_timeout: default_delivery_timeout(),
            default_quality: QualityPreference::Any,
        }
    }
}

/// Catalog cache settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live of every entry, counted from insertion (default: 2 days)
    #[serde(default = "default_cache_ttl", with = "duration_serde")]
    pub ttl: Duration,

    /// Maximum number of entries before least-recently-used eviction (default: 80)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for the catalog and the download pipeline
///
/// Every section has sensible defaults, so `Config::default()` talks to the
/// public site and stores files under `./downloaded_audios`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Audio download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Catalog cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry policy applied to catalog fetches
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Parse a JSON configuration document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that would otherwise fail at first use
    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.site.base_url).is_err() {
            return Err(invalid(
                format!("base URL '{}' is not a valid URL", self.site.base_url),
                "site.base_url",
            ));
        }
        if self.cache.capacity == 0 {
            return Err(invalid("cache capacity must be at least 1", "cache.capacity"));
        }
        if self.cache.ttl.is_zero() {
            return Err(invalid("cache TTL must be non-zero", "cache.ttl"));
        }
        if self.http.request_timeout.is_zero() {
            return Err(invalid(
                "request timeout must be non-zero",
                "http.request_timeout",
            ));
        }
        if self.http.max_concurrent_pages == 0 {
            return Err(invalid(
                "at least one listing page must be fetched at a time",
                "http.max_concurrent_pages",
            ));
        }
        if self.download.delivery_timeout.is_zero() {
            return Err(invalid(
                "delivery timeout must be non-zero",
                "download.delivery_timeout",
            ));
        }
        if self.download.download_timeout.is_zero() {
            return Err(invalid(
                "download timeout must be non-zero",
                "download.download_timeout",
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(invalid(
                "backoff multiplier must be at least 1.0",
                "retry.backoff_multiplier",
            ));
        }
        Ok(())
    }

    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }
}

fn invalid(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://music-fa.com".to_string()
}

fn default_user_agent() -> String {
    concat!("musicfa-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloaded_audios")
}

fn default_max_concurrent_pages() -> usize {
    4
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_delivery_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(172_800)
}

fn default_cache_capacity() -> usize {
    80
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QualityTier;

    #[test]
    fn defaults_match_site_conventions() {
        let config = Config::default();
        assert_eq!(config.site.base_url, "https://music-fa.com");
        assert_eq!(config.cache.ttl, Duration::from_secs(2 * 24 * 60 * 60));
        assert_eq!(config.cache.capacity, 80);
        assert_eq!(config.download_dir(), &PathBuf::from("downloaded_audios"));
        assert_eq!(config.download.default_quality, QualityPreference::Any);
        config.validate().expect("defaults must validate");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.download.download_timeout, Duration::from_secs(300));
        assert_eq!(config.download.delivery_timeout, Duration::from_secs(600));
        assert_eq!(config.http.max_concurrent_pages, 4);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let json = r#"{
            "download": { "download_dir": "/srv/audio", "default_quality": "320" },
            "cache": { "ttl": 60 }
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.download.download_dir, PathBuf::from("/srv/audio"));
        assert_eq!(
            config.download.default_quality,
            QualityPreference::Tier(QualityTier::Kbps320)
        );
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.capacity, 80, "unspecified field keeps default");
    }

    #[test]
    fn zero_capacity_is_rejected_with_key() {
        let err = Config::from_json(r#"{ "cache": { "capacity": 0 } }"#).unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("cache.capacity")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn zero_page_concurrency_is_rejected() {
        let err = Config::from_json(r#"{ "http": { "max_concurrent_pages": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Config { key: Some(ref key), .. } if key == "http.max_concurrent_pages"
        ));
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let mut config = Config::default();
        config.site.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["cache"]["ttl"], 172_800);
        assert_eq!(json["download"]["default_quality"], "any");
    }
}
