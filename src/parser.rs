//! Catalog markup parsing
//!
//! Pure functions from page markup to catalog entities. Nothing here touches
//! the network, so every function is synchronous; `scraper::Html` is not `Send`
//! and must not live across an await point in the callers.
//!
//! The site structure these functions rely on:
//!
//! | Page          | Container            | Entity                          |
//! |---------------|----------------------|---------------------------------|
//! | Home          | `aside.rwr`          | one `li` per artist             |
//! | Artist list   | document             | one `article` per song          |
//! | Artist list   | `div.pnavifa.fxmf`   | last `a` links to the last page |
//! | Song detail   | `div.cntfa`          | `a[href$=".mp3"]` audio links   |

use crate::error::{ParseError, Result};
use crate::types::{Artist, Song};
use crate::utils::{last_path_segment, second_to_last_segment};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use tracing::warn;

/// Container holding the artist list on the home page
pub const ARTIST_LIST_CONTAINER: &str = "aside.rwr";
/// Pagination block on an artist listing page
pub const PAGINATION_BLOCK: &str = "div.pnavifa.fxmf";
/// Container holding the download links on a song detail page
pub const SONG_DETAIL_CONTAINER: &str = "div.cntfa";

/// Localized "download song " prefix of every song link title
const SONG_TITLE_PREFIX: &str = "دانلود آهنگ ";

fn selector(css: &'static str) -> std::result::Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

fn first_link<'a>(element: ElementRef<'a>, links: &Selector) -> Option<(ElementRef<'a>, &'a str)> {
    element
        .select(links)
        .next()
        .and_then(|link| link.value().attr("href").map(|href| (link, href)))
}

/// Parse the artist list from the home page
///
/// Names are the trimmed text of each list item. Items without a link are
/// skipped.
///
/// # Errors
///
/// Returns [`ParseError::MissingContainer`] when `aside.rwr` is absent.
pub fn parse_artist_list(markup: &str) -> Result<Vec<Artist>> {
    let document = Html::parse_document(markup);
    let container_selector = selector(ARTIST_LIST_CONTAINER)?;
    let item_selector = selector("li")?;
    let link_selector = selector("a[href]")?;

    let container = document
        .select(&container_selector)
        .next()
        .ok_or(ParseError::MissingContainer {
            selector: ARTIST_LIST_CONTAINER,
        })?;

    let mut artists = Vec::new();
    for item in container.select(&item_selector) {
        let name = item.text().collect::<String>().trim().to_string();
        match first_link(item, &link_selector) {
            Some((_, href)) if !name.is_empty() => artists.push(Artist::new(name, href)),
            _ => warn!(name = %name, "Skipping artist list item without name or link"),
        }
    }
    Ok(artists)
}

/// Parse the songs of one artist listing page
///
/// A page without articles yields an empty list. Articles whose link lacks an
/// id segment are skipped.
pub fn parse_song_page(markup: &str) -> Result<Vec<Song>> {
    let document = Html::parse_document(markup);
    let article_selector = selector("article")?;
    let link_selector = selector("a[href]")?;

    let mut songs = Vec::new();
    for article in document.select(&article_selector) {
        let Some((link, href)) = first_link(article, &link_selector) else {
            warn!("Skipping article without a link");
            continue;
        };
        let Some(id) = second_to_last_segment(href) else {
            warn!(href, "Skipping article whose link has no id segment");
            continue;
        };

        let title = match link.value().attr("title") {
            Some(title) => title.to_string(),
            None => link.text().collect::<String>(),
        };
        let name = title.replace(SONG_TITLE_PREFIX, "").trim().to_string();
        songs.push(Song::new(id, name, href));
    }
    Ok(songs)
}

/// Extract the last page number from an artist listing page
///
/// Returns `None` when the pagination block is absent (or has no links), which
/// means the listing has exactly one page.
///
/// # Errors
///
/// Returns [`ParseError::InvalidPageIndex`] when the last pagination link does
/// not carry a numeric page segment.
pub fn extract_last_page_index(markup: &str) -> Result<Option<u32>> {
    let document = Html::parse_document(markup);
    let block_selector = selector(PAGINATION_BLOCK)?;
    let link_selector = selector("a[href]")?;

    let Some(block) = document.select(&block_selector).next() else {
        return Ok(None);
    };
    let Some(href) = block
        .select(&link_selector)
        .last()
        .and_then(|link| link.value().attr("href"))
    else {
        return Ok(None);
    };

    second_to_last_segment(href)
        .and_then(|segment| segment.parse::<u32>().ok())
        .map(Some)
        .ok_or_else(|| {
            ParseError::InvalidPageIndex {
                href: href.to_string(),
            }
            .into()
        })
}

/// Collect the distinct audio links advertised on a song detail page
///
/// Only links whose path ends in `.mp3` are kept. An empty set is returned as
/// is; deciding that it is an error is up to the caller.
///
/// # Errors
///
/// Returns [`ParseError::MissingContainer`] when `div.cntfa` is absent.
pub fn parse_audio_links(markup: &str) -> Result<BTreeSet<String>> {
    let document = Html::parse_document(markup);
    let container_selector = selector(SONG_DETAIL_CONTAINER)?;
    let link_selector = selector("a[href]")?;

    let container = document
        .select(&container_selector)
        .next()
        .ok_or(ParseError::MissingContainer {
            selector: SONG_DETAIL_CONTAINER,
        })?;

    Ok(container
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| last_path_segment(href).is_some_and(|name| name.ends_with(".mp3")))
        .map(str::to_string)
        .collect())
}
