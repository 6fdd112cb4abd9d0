//! File retrieval and song/artist downloads

use super::Catalog;
use crate::error::{Error, Result};
use crate::retry::fetch_with_retry;
use crate::types::{Artist, QualityPreference, Song};
use crate::utils::{decode_spaces, last_path_segment};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of downloading one song as part of a bulk download
#[derive(Debug)]
pub struct SongOutcome {
    /// The song that was attempted
    pub song: Song,
    /// Stored files, or why the song failed
    pub result: Result<Vec<PathBuf>>,
}

/// Per-song outcomes of an artist page or discography download
#[derive(Debug)]
pub struct ArtistDownloadReport {
    /// The artist whose songs were downloaded
    pub artist: Artist,
    /// Directory the files were stored in
    pub directory: PathBuf,
    /// One outcome per attempted song, in listing order
    pub outcomes: Vec<SongOutcome>,
}

impl ArtistDownloadReport {
    /// Number of songs stored successfully
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of songs that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Local file name for an audio URL: its final segment with `%20` decoded
fn file_name_for(url: &str) -> Result<String> {
    last_path_segment(url)
        .map(|segment| decode_spaces(&segment))
        .filter(|name| !name.trim().is_empty() && name != "." && name != ".." && !name.contains('\\'))
        .ok_or_else(|| Error::InvalidFilename {
            url: url.to_string(),
        })
}

impl Catalog {
    /// Store the body of `url` in `directory` unless a non-empty copy exists
    ///
    /// - Missing file: download it.
    /// - Non-empty file: return its path without any network request.
    /// - Zero-size file (an earlier transfer broke): download it again.
    ///
    /// Bodies are written to a hidden temp file in the same directory and
    /// renamed into place, so a partial transfer never appears under the final
    /// name. The whole retrieval is bounded by the configured download timeout.
    pub async fn retrieve(&self, url: &str, directory: &Path) -> Result<PathBuf> {
        let file_name = file_name_for(url)?;
        tokio::fs::create_dir_all(directory).await?;
        let dest = directory.join(&file_name);

        match tokio::fs::metadata(&dest).await {
            Ok(meta) if meta.len() > 0 => {
                info!(file = %file_name, "Already downloaded, skipping");
                return Ok(dest);
            }
            Ok(_) => info!(file = %file_name, "Existing file is empty, redownloading"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(file = %file_name, "Not downloaded yet, downloading")
            }
            Err(e) => return Err(e.into()),
        }

        let budget = self.config.download.download_timeout;
        let transfer = fetch_with_retry(&self.config.retry, || {
            self.write_atomically(url, directory, &dest)
        });
        match tokio::time::timeout(budget, transfer).await {
            Ok(written) => {
                let written = written?;
                info!(file = %file_name, bytes = written, "Downloaded");
                Ok(dest)
            }
            Err(_) => {
                warn!(file = %file_name, timeout_secs = budget.as_secs(), "Download timed out");
                Err(Error::Timeout {
                    operation: format!("download of {file_name}"),
                    after: budget,
                })
            }
        }
    }

    async fn write_atomically(&self, url: &str, directory: &Path, dest: &Path) -> Result<u64> {
        // Removed on drop unless persisted, which covers errors and timeouts
        let temp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(directory)?
            .into_temp_path();
        let written = self.fetcher.fetch_to_file(url, &temp).await?;
        if written == 0 {
            warn!(url, "Server returned an empty body");
            return Err(Error::EmptyBody {
                url: url.to_string(),
            });
        }
        temp.persist(dest).map_err(|e| e.error)?;
        Ok(written)
    }

    /// Download a song into the configured download directory
    ///
    /// One file per track on the detail page, in the preferred quality when
    /// available. Returns the stored paths.
    pub async fn download(&self, song: &Song, preference: QualityPreference) -> Result<Vec<PathBuf>> {
        let directory = self.config.download_dir().clone();
        self.download_into(song, preference, &directory).await
    }

    /// Download a song into `directory`
    pub async fn download_into(
        &self,
        song: &Song,
        preference: QualityPreference,
        directory: &Path,
    ) -> Result<Vec<PathBuf>> {
        let variants = self.resolve_variants(song).await?;
        let links = variants.select_links(preference);
        info!(song = %song.name(), files = links.len(), "Downloading song");
        try_join_all(links.iter().map(|link| self.retrieve(link, directory))).await
    }

    /// Directory holding an artist's bulk downloads: `download_dir/<artist name>`
    pub fn artist_directory(&self, artist: &Artist) -> PathBuf {
        let name: String = artist
            .name()
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.config.download_dir().join(name)
    }

    /// Download every song on one page of an artist's listing
    ///
    /// Individual song failures are recorded in the report; only failing to
    /// list the page is an error.
    pub async fn download_artist_page(
        &self,
        artist: &Artist,
        page: u32,
        preference: QualityPreference,
    ) -> Result<ArtistDownloadReport> {
        let listing = self.list_songs_page(artist, page).await?;
        self.download_songs(artist, listing.entries, preference).await
    }

    /// Download every song of an artist, page by page
    pub async fn download_discography(
        &self,
        artist: &Artist,
        preference: QualityPreference,
    ) -> Result<ArtistDownloadReport> {
        let pages = self.artist_songs(artist).await?;
        let songs = pages.iter().flatten().cloned().collect();
        self.download_songs(artist, songs, preference).await
    }

    async fn download_songs(
        &self,
        artist: &Artist,
        songs: Vec<Song>,
        preference: QualityPreference,
    ) -> Result<ArtistDownloadReport> {
        let directory = self.artist_directory(artist);
        tokio::fs::create_dir_all(&directory).await?;

        let mut outcomes = Vec::with_capacity(songs.len());
        for song in songs {
            let result = self.download_into(&song, preference, &directory).await;
            if let Err(e) = &result {
                warn!(artist = %artist.name(), song = %song.name(), error = %e, "Song download failed");
            }
            outcomes.push(SongOutcome { song, result });
        }

        let report = ArtistDownloadReport {
            artist: artist.clone(),
            directory,
            outcomes,
        };
        info!(
            artist = %artist.name(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Artist download finished"
        );
        Ok(report)
    }
}
