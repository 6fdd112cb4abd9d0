//! Test configuration helpers for catalogs pointed at a mock site

use super::site::MockSite;
use musicfa_dl::{Catalog, Config};
use std::time::Duration;
use tempfile::TempDir;

/// Config for `site` storing downloads in a fresh temp dir, with fast retries
///
/// Returns the tempdir, which must be kept alive.
pub fn test_config(site: &MockSite) -> (Config, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.site.base_url = site.base_url();
    config.download.download_dir = temp_dir.path().join("downloaded_audios");
    config.http.request_timeout = Duration::from_secs(5);
    config.retry.max_attempts = 1;
    config.retry.initial_delay = Duration::from_millis(10);
    config.retry.jitter = false;
    (config, temp_dir)
}

/// Catalog over real HTTP against `site`
pub fn create_catalog(site: &MockSite) -> (Catalog, TempDir) {
    let (config, temp_dir) = test_config(site);
    (Catalog::new(config).unwrap(), temp_dir)
}

/// "Artist 1".."Artist N"
pub fn artist_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Artist {i}")).collect()
}
