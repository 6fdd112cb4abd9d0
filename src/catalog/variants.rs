//! Audio variants advertised on a song detail page
//!
//! A detail page may host several tracks, each in one or more quality tiers.
//! Tier and track name are derived from the file name by fixed offsets:
//!
//! ```text
//! Masih - Rose (320).mp3
//!              ^^^         tier: 8..5 characters from the end
//! ^^^^^^^^^^^^             track: everything before the last 10 characters
//! ```
//!
//! This is fragile by nature: a file named without the ` (NNN)` suffix is
//! classified as `unknown` and keeps its whole stem as track name, so distinct
//! unmarked files never collapse into one track.

use super::Catalog;
use crate::error::{Error, Result};
use crate::parser;
use crate::types::{QualityPreference, QualityTier, Song};
use crate::utils::{decode_spaces, last_path_segment};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// Length of the ` (320).mp3` suffix
const QUALITY_SUFFIX_LEN: usize = 10;
/// Distance of the quality marker start from the end of the file name
const MARKER_START_FROM_END: usize = 8;
/// Distance of the quality marker end from the end of the file name
const MARKER_END_FROM_END: usize = 5;

/// Derive `(track name, quality tier)` from an audio URL
///
/// Returns `None` when the URL has no file name.
///
/// ```
/// use musicfa_dl::catalog::classify_audio_link;
/// use musicfa_dl::types::QualityTier;
///
/// let (track, tier) = classify_audio_link(
///     "https://ups.music-fa.com/tagdl/6e41/Masih%20-%20Rose%20(320).mp3",
/// ).unwrap();
/// assert_eq!(track, "Masih - Rose");
/// assert_eq!(tier, QualityTier::Kbps320);
/// ```
pub fn classify_audio_link(url: &str) -> Option<(String, QualityTier)> {
    let file_name = decode_spaces(&last_path_segment(url)?);
    let chars: Vec<char> = file_name.chars().collect();
    let len = chars.len();

    let tier = if len >= MARKER_START_FROM_END {
        let marker: String = chars[len - MARKER_START_FROM_END..len - MARKER_END_FROM_END]
            .iter()
            .collect();
        QualityTier::from_marker(&marker)
    } else {
        QualityTier::Unknown
    };

    let track = match tier {
        QualityTier::Kbps128 | QualityTier::Kbps320 if len >= QUALITY_SUFFIX_LEN => {
            chars[..len - QUALITY_SUFFIX_LEN].iter().collect::<String>()
        }
        _ => file_name
            .strip_suffix(".mp3")
            .unwrap_or(&file_name)
            .to_string(),
    };
    Some((track, tier))
}

/// Track name to (quality tier to URL)
///
/// Each tier of a track holds exactly one URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioVariantMap {
    tracks: BTreeMap<String, BTreeMap<QualityTier, String>>,
}

impl AudioVariantMap {
    /// Group distinct audio links by track and tier
    ///
    /// When two links land on the same `(track, tier)`, the first one wins.
    /// Links without a file name are skipped.
    pub fn from_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for link in links {
            let link = link.into();
            let Some((track, tier)) = classify_audio_link(&link) else {
                warn!(url = %link, "Skipping audio link without a file name");
                continue;
            };
            match map.tracks.entry(track.clone()).or_default().entry(tier) {
                Entry::Vacant(slot) => {
                    slot.insert(link);
                }
                Entry::Occupied(existing) => warn!(
                    track = %track,
                    tier = %tier,
                    kept = %existing.get(),
                    dropped = %link,
                    "Conflicting audio links for the same track and tier"
                ),
            }
        }
        map
    }

    /// Number of distinct tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no track was found
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in name order with their available tiers
    pub fn tracks(&self) -> impl Iterator<Item = (&str, &BTreeMap<QualityTier, String>)> {
        self.tracks
            .iter()
            .map(|(name, tiers)| (name.as_str(), tiers))
    }

    /// URL of one track in one tier
    pub fn get(&self, track: &str, tier: QualityTier) -> Option<&str> {
        self.tracks.get(track)?.get(&tier).map(String::as_str)
    }

    /// Pick one URL per track
    ///
    /// The preferred tier when the track offers it, otherwise the best tier
    /// available (320, then 128, then unknown).
    pub fn select_links(&self, preference: QualityPreference) -> Vec<String> {
        self.tracks
            .values()
            .filter_map(|tiers| {
                let preferred = match preference {
                    QualityPreference::Tier(tier) => tiers.get(&tier),
                    QualityPreference::Any => None,
                };
                preferred
                    .or_else(|| {
                        tiers
                            .iter()
                            .max_by_key(|(tier, _)| tier.rank())
                            .map(|(_, url)| url)
                    })
                    .cloned()
            })
            .collect()
    }
}

impl Catalog {
    /// Fetch a song's detail page and group its audio links
    ///
    /// Not memoized: download links may be short-lived.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAudioFound`] when the page advertises no `.mp3` link,
    /// and propagates fetch and parse failures.
    pub async fn resolve_variants(&self, song: &Song) -> Result<AudioVariantMap> {
        let markup = self.fetch_page(song.url()).await?;
        let links = parser::parse_audio_links(&markup)?;
        if links.is_empty() {
            return Err(Error::NoAudioFound {
                url: song.url().to_string(),
            });
        }

        let variants = AudioVariantMap::from_links(links);
        if variants.is_empty() {
            return Err(Error::NoAudioFound {
                url: song.url().to_string(),
            });
        }
        debug!(song = %song.name(), tracks = variants.len(), "Resolved audio variants");
        Ok(variants)
    }
}
