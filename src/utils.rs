//! Utility functions for URL paths, file names and pagination

use crate::error::{Error, Result};
use crate::types::Page;

/// Return the final path segment of a URL, ignoring query and fragment
///
/// The segment is returned as written, without normalizing its escapes, so a
/// non-ASCII file name stays readable.
///
/// # Examples
///
/// ```
/// use musicfa_dl::utils::last_path_segment;
///
/// assert_eq!(
///     last_path_segment("https://ups.music-fa.com/tagdl/6e41/Masih%20-%20Rose%20(320).mp3"),
///     Some("Masih%20-%20Rose%20(320).mp3".to_string())
/// );
/// assert_eq!(last_path_segment("https://music-fa.com/"), None);
/// ```
pub fn last_path_segment(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    // Skip the authority of absolute URLs so "https://host" has no segment
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |start| &rest[start..]),
        None => without_query,
    };
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Return the segment before the last one when the href is split on `/`
///
/// Site links end with a slash (`.../download-song/12345/`), so this is the
/// last meaningful segment of such a link.
pub fn second_to_last_segment(href: &str) -> Option<&str> {
    let mut segments = href.rsplit('/');
    segments.next()?;
    segments.next().filter(|segment| !segment.is_empty())
}

/// Decode the space escapes of a URL file name
///
/// Only `%20` is decoded; other escapes stay as they are so the resulting file
/// name matches what was stored on earlier runs.
pub fn decode_spaces(segment: &str) -> String {
    segment.replace("%20", " ")
}

/// Split a listing into consecutive pages of `page_size` entries
///
/// The last page may be shorter. An empty listing yields no pages.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(page_size.max(1))
        .map(<[T]>::to_vec)
        .collect()
}

/// Select the 1-based page `page` of an already paginated listing
///
/// An empty listing has exactly one (empty) page.
///
/// # Errors
///
/// Returns [`Error::PageOutOfRange`] for page 0 or a page past the end.
pub fn page_of<T: Clone>(pages: &[Vec<T>], page: u32) -> Result<Page<T>> {
    let total = pages.len().max(1) as u32;
    if page == 0 || page > total {
        return Err(Error::PageOutOfRange { page, total });
    }
    // 1-based externally, 0-based internally
    let entries = pages
        .get((page - 1) as usize)
        .cloned()
        .unwrap_or_default();
    Ok(Page {
        entries,
        page,
        total_pages: total,
    })
}
