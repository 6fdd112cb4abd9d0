//! Song listings aggregated across the pages of an artist listing

use super::Catalog;
use crate::cache_key;
use crate::error::Result;
use crate::parser;
use crate::types::{Artist, Page, Song};
use crate::utils::page_of;
use futures::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use tracing::{debug, info};

const ARTIST_PAGE: &str = "artist_page";
const ARTIST_SONGS: &str = "artist_songs";

/// URL of the 1-based page `page` of an artist listing
///
/// Page 1 is the artist URL itself; later pages append `/page/{n}`.
///
/// ```
/// use musicfa_dl::catalog::page_url;
/// use musicfa_dl::types::Artist;
///
/// let artist = Artist::new("Masih", "https://music-fa.com/artist/masih/");
/// assert_eq!(page_url(&artist, 1), "https://music-fa.com/artist/masih/");
/// assert_eq!(page_url(&artist, 3), "https://music-fa.com/artist/masih/page/3");
/// ```
pub fn page_url(artist: &Artist, page: u32) -> String {
    if page <= 1 {
        artist.url().to_string()
    } else {
        format!("{}/page/{page}", artist.url().trim_end_matches('/'))
    }
}

impl Catalog {
    /// Songs on one site page of an artist listing
    ///
    /// Memoized per `(artist name, page)`.
    pub async fn artist_page_songs(&self, artist: &Artist, page: u32) -> Result<Arc<Vec<Song>>> {
        self.cache
            .get_or_compute(cache_key!(ARTIST_PAGE, artist, page), || async {
                let url = page_url(artist, page);
                let markup = self.fetch_page(&url).await?;
                let songs = parser::parse_song_page(&markup)?;
                debug!(artist = %artist.name(), page, count = songs.len(), "Parsed song page");
                Ok(Arc::new(songs))
            })
            .await
    }

    /// Every song of an artist, partitioned by site page, in page order
    ///
    /// Page 1 is fetched first to learn the page count; its songs are reused and
    /// pages `2..=last` are then fetched concurrently, at most
    /// `http.max_concurrent_pages` at a time. Memoized per artist name.
    pub async fn artist_songs(&self, artist: &Artist) -> Result<Arc<Vec<Vec<Song>>>> {
        self.cache
            .get_or_compute(cache_key!(ARTIST_SONGS, artist), || async {
                let markup = self.fetch_page(&page_url(artist, 1)).await?;
                let first = parser::parse_song_page(&markup)?;
                let last = parser::extract_last_page_index(&markup)?.unwrap_or(1).max(1);

                // Seed the per-page entry so page 1 is never fetched twice
                let first = Arc::new(first);
                self.cache
                    .insert(cache_key!(ARTIST_PAGE, artist, 1u32), Arc::clone(&first));

                let rest: Vec<Arc<Vec<Song>>> = stream::iter(2..=last)
                    .map(|page| self.artist_page_songs(artist, page))
                    .buffered(self.config.http.max_concurrent_pages)
                    .try_collect()
                    .await?;

                let mut pages = Vec::with_capacity(last as usize);
                pages.push(first.as_ref().clone());
                pages.extend(rest.iter().map(|songs| songs.as_ref().clone()));

                info!(
                    artist = %artist.name(),
                    pages = pages.len(),
                    songs = pages.iter().map(Vec::len).sum::<usize>(),
                    "Loaded artist songs"
                );
                Ok(Arc::new(pages))
            })
            .await
    }

    /// One 1-based page of an artist's song listing
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PageOutOfRange`] for page 0 or a page past the
    /// end, and propagates fetch and parse failures.
    pub async fn list_songs_page(&self, artist: &Artist, page: u32) -> Result<Page<Song>> {
        let pages = self.artist_songs(artist).await?;
        page_of(pages.as_slice(), page)
    }

    /// Whether the song listing of `artist` is currently cached
    pub fn songs_cached(&self, artist: &Artist) -> bool {
        self.cache.contains(&cache_key!(ARTIST_SONGS, artist))
    }
}
