//! Shared test helpers: an in-memory fetcher and markup builders

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub(crate) const BASE_URL: &str = "https://music-fa.test";

/// In-memory fetcher serving canned pages and files and counting requests
#[derive(Default)]
pub(crate) struct FakeFetcher {
    pages: Mutex<HashMap<String, String>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashMap<String, VecDeque<u16>>>,
    hits: Mutex<HashMap<String, usize>>,
    file_delay: Option<Duration>,
    page_delay: Option<Duration>,
    pages_in_flight: AtomicUsize,
    peak_pages_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.lock().unwrap().insert(url.into(), markup.into());
        self
    }

    pub(crate) fn file(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.files.lock().unwrap().insert(url.into(), body.into());
        self
    }

    /// Answer the next request for `url` with `status` before serving it normally
    pub(crate) fn fail_once(self, url: impl Into<String>, status: u16) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(status);
        self
    }

    pub(crate) fn slow_files(mut self, delay: Duration) -> Self {
        self.file_delay = Some(delay);
        self
    }

    pub(crate) fn slow_pages(mut self, delay: Duration) -> Self {
        self.page_delay = Some(delay);
        self
    }

    /// Most page requests ever served at the same time
    pub(crate) fn peak_pages_in_flight(&self) -> usize {
        self.peak_pages_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn record(&self, url: &str) -> Result<()> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        if let Some(status) = self
            .failures
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
        {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(())
    }
}

fn not_found(url: &str) -> Error {
    Error::Status {
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let now = self.pages_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_pages_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.page_delay {
            tokio::time::sleep(delay).await;
        }
        let page = self.record(url).and_then(|()| {
            let page = self.pages.lock().unwrap().get(url).cloned();
            page.ok_or_else(|| not_found(url))
        });
        self.pages_in_flight.fetch_sub(1, Ordering::SeqCst);
        page
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        self.record(url)?;
        if let Some(delay) = self.file_delay {
            tokio::time::sleep(delay).await;
        }
        let body = self.files.lock().unwrap().get(url).cloned();
        let body = body.ok_or_else(|| not_found(url))?;
        tokio::fs::write(dest, &body).await?;
        Ok(body.len() as u64)
    }
}

/// Config pointing at the fake site, storing files under `temp_dir`, with
/// retries disabled
pub(crate) fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.site.base_url = BASE_URL.to_string();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.retry.max_attempts = 0;
    config.retry.jitter = false;
    config
}

/// Create a catalog over `fetcher`. Returns the tempdir, which must be kept alive.
pub(crate) fn create_test_catalog(fetcher: Arc<FakeFetcher>) -> (Catalog, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::with_fetcher(test_config(&temp_dir), fetcher).unwrap();
    (catalog, temp_dir)
}

pub(crate) fn artist_url(slug: &str) -> String {
    format!("{BASE_URL}/artist/{slug}/")
}

pub(crate) fn song_url(id: u32) -> String {
    format!("{BASE_URL}/download-song/{id}/")
}

/// Home page listing `count` artists named "Artist 1".."Artist N"
pub(crate) fn home_with_artists(count: usize) -> String {
    let artists: Vec<(String, String)> = (1..=count)
        .map(|i| (format!("Artist {i}"), artist_url(&format!("artist-{i}"))))
        .collect();
    artist_list_html(&artists)
}

pub(crate) fn artist_list_html(artists: &[(String, String)]) -> String {
    let items: String = artists
        .iter()
        .map(|(name, url)| format!(r#"<li><a href="{url}">{name}</a></li>"#))
        .collect();
    format!(r#"<html><body><aside class="rwr"><ul>{items}</ul></aside></body></html>"#)
}

/// Listing page with one article per song id and an optional pagination block
pub(crate) fn song_page_html(artist_slug: &str, ids: &[u32], last_page: Option<u32>) -> String {
    let articles: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<article><a href="{}" title="دانلود آهنگ Song {id}">Song {id}</a></article>"#,
                song_url(*id)
            )
        })
        .collect();
    let pagination = last_page
        .map(|last| {
            format!(
                r#"<div class="pnavifa fxmf"><a href="{0}page/2/">2</a><a href="{0}page/{last}/">»</a></div>"#,
                artist_url(artist_slug)
            )
        })
        .unwrap_or_default();
    format!("<html><body>{articles}{pagination}</body></html>")
}

/// Song detail page advertising `links`
pub(crate) fn detail_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{link}">download</a>"#))
        .collect();
    format!(r#"<html><body><div class="cntfa"><img src="cover.jpg">{anchors}</div></body></html>"#)
}
