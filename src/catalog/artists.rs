//! Artist list and artist lookup

use super::Catalog;
use crate::cache_key;
use crate::error::{Error, Result};
use crate::parser;
use crate::types::{Artist, PAGE_SIZE, Page};
use crate::utils::{page_of, paginate};
use std::sync::Arc;
use tracing::{debug, info};

const ALL_ARTISTS: &str = "all_artists";

impl Catalog {
    /// Every artist listed on the site home page, in listing order
    ///
    /// Memoized; repeated calls within the cache TTL issue no request.
    pub async fn all_artists(&self) -> Result<Arc<Vec<Artist>>> {
        self.cache
            .get_or_compute(cache_key!(ALL_ARTISTS), || async {
                let markup = self.fetch_page(&self.config.site.base_url).await?;
                let artists = parser::parse_artist_list(&markup)?;
                info!(count = artists.len(), "Loaded artist list");
                Ok(Arc::new(artists))
            })
            .await
    }

    /// One 1-based page of the artist list
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageOutOfRange`] for page 0 or a page past the end, and
    /// propagates fetch and parse failures.
    pub async fn list_artists_page(&self, page: u32) -> Result<Page<Artist>> {
        let artists = self.all_artists().await?;
        page_of(&paginate(artists.as_slice(), PAGE_SIZE), page)
    }

    /// Find the listed artist whose name equals `name` exactly
    ///
    /// Matching is case and whitespace sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtistNotFound`] when no artist has this name.
    pub async fn resolve_artist_by_name(&self, name: &str) -> Result<Artist> {
        let artists = self.all_artists().await?;
        match artists.iter().find(|artist| artist.name() == name) {
            Some(artist) => {
                debug!(artist = %artist.name(), "Resolved artist by name");
                Ok(artist.clone())
            }
            None => Err(Error::ArtistNotFound(name.to_string())),
        }
    }

    /// Whether the artist list is currently cached
    ///
    /// Lets a front end decide whether to show a "fetching" notice first.
    pub fn artists_cached(&self) -> bool {
        self.cache.contains(&cache_key!(ALL_ARTISTS))
    }
}
