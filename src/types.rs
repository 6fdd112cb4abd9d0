//! Core types for musicfa-dl

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of entities shown on one page of a listing
pub const PAGE_SIZE: usize = 10;

/// Identifier of the chat user owning a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new UserId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An artist as listed on the site
///
/// Identity is the exact `name` string. Artists are immutable once built and
/// never carry their song listing; songs are always returned as a separate value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artist {
    name: String,
    url: String,
}

impl Artist {
    /// Create an artist from its display name and listing URL
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Display name (also the artist's identity)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL of the artist's first song listing page
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Artist(\"{}\")", self.name)
    }
}

/// A song entry from an artist listing
///
/// `url` points at the song's detail page, not at an audio file. One detail page
/// may host several distinct tracks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    id: String,
    name: String,
    url: String,
}

impl Song {
    /// Create a song from its detail-page id, display name and detail-page URL
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }

    /// Identifier taken from the detail-page URL path
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detail page URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Song(name: '{}', id: {})", self.name, self.id)
    }
}

/// One page of a paginated listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Entities on this page, in listing order
    pub entries: Vec<T>,
    /// 1-based page number
    pub page: u32,
    /// Number of pages in the listing (at least 1)
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Whether a previous page exists
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Audio quality tier inferred from the file name
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    /// 128 kbps
    #[serde(rename = "128")]
    Kbps128,
    /// 320 kbps
    #[serde(rename = "320")]
    Kbps320,
    /// No recognizable quality marker
    #[serde(rename = "unknown")]
    Unknown,
}

impl QualityTier {
    /// Classify a three-character quality marker
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "128" => QualityTier::Kbps128,
            "320" => QualityTier::Kbps320,
            _ => QualityTier::Unknown,
        }
    }

    /// Wire representation ("128", "320" or "unknown")
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Kbps128 => "128",
            QualityTier::Kbps320 => "320",
            QualityTier::Unknown => "unknown",
        }
    }

    /// Fallback ranking used when the preferred tier is missing (higher wins)
    pub(crate) fn rank(&self) -> u8 {
        match self {
            QualityTier::Kbps320 => 2,
            QualityTier::Kbps128 => 1,
            QualityTier::Unknown => 0,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality requested by the user for a download
///
/// Parsed leniently: anything other than a known tier means "any tier".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QualityPreference {
    /// Prefer this tier when the track offers it
    Tier(QualityTier),
    /// No preference
    #[default]
    Any,
}

impl From<&str> for QualityPreference {
    fn from(value: &str) -> Self {
        match value {
            "128" => QualityPreference::Tier(QualityTier::Kbps128),
            "320" => QualityPreference::Tier(QualityTier::Kbps320),
            "unknown" => QualityPreference::Tier(QualityTier::Unknown),
            _ => QualityPreference::Any,
        }
    }
}

impl From<String> for QualityPreference {
    fn from(value: String) -> Self {
        QualityPreference::from(value.as_str())
    }
}

impl From<QualityPreference> for String {
    fn from(value: QualityPreference) -> Self {
        match value {
            QualityPreference::Tier(tier) => tier.as_str().to_string(),
            QualityPreference::Any => "any".to_string(),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_marker_classification() {
        assert_eq!(QualityTier::from_marker("320"), QualityTier::Kbps320);
        assert_eq!(QualityTier::from_marker("128"), QualityTier::Kbps128);
        assert_eq!(QualityTier::from_marker("e R"), QualityTier::Unknown);
        assert_eq!(QualityTier::from_marker(""), QualityTier::Unknown);
    }

    #[test]
    fn unrecognized_preference_means_any() {
        assert_eq!(
            QualityPreference::from("320"),
            QualityPreference::Tier(QualityTier::Kbps320)
        );
        assert_eq!(QualityPreference::from("any"), QualityPreference::Any);
        assert_eq!(QualityPreference::from("999"), QualityPreference::Any);
    }

    #[test]
    fn preference_serializes_as_plain_string() {
        let json = serde_json::to_string(&QualityPreference::Tier(QualityTier::Kbps128)).unwrap();
        assert_eq!(json, "\"128\"");
        let back: QualityPreference = serde_json::from_str("\"any\"").unwrap();
        assert_eq!(back, QualityPreference::Any);
    }

    #[test]
    fn page_boundaries() {
        let first = Page {
            entries: vec![1, 2],
            page: 1,
            total_pages: 3,
        };
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = Page {
            entries: vec![3],
            page: 3,
            total_pages: 3,
        };
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[test]
    fn artists_with_equal_fields_are_equal() {
        let a = Artist::new("Masih", "https://music-fa.com/artist/masih/");
        let b = Artist::new("Masih", "https://music-fa.com/artist/masih/");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Artist(\"Masih\")");
    }
}
