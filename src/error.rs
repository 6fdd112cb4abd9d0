//! Error types for musicfa-dl
//!
//! This module provides the error taxonomy shared by every layer of the crate:
//! - Network failures (transport errors, non-success statuses, timeouts)
//! - Parse failures (the site markup no longer matches the expected structure)
//! - Lookup failures (unknown artist, page outside the listing)
//! - Download failures (no audio advertised, unusable filename, I/O)

use std::time::Duration;
use thiserror::Error;

/// Result type alias for musicfa-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for musicfa-dl
///
/// The session layer maps each variant to a user-visible notice; see
/// [`Error::is_network`] and [`Error::is_not_found`] for the coarse categories.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "cache.capacity")
        key: Option<String>,
    },

    /// Transport-level failure (connection refused, reset, body read failure)
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL that was requested
        url: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// The server answered successfully but sent no bytes
    #[error("empty response body from {url}")]
    EmptyBody {
        /// The URL that was requested
        url: String,
    },

    /// An operation exceeded its time budget and was abandoned
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout {
        /// What was being done (e.g., "download of Rose (320).mp3")
        operation: String,
        /// The budget that was exceeded
        after: Duration,
    },

    /// The site markup did not have the expected structure
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// No artist with exactly this name exists in the catalog
    #[error("artist not found: {0}")]
    ArtistNotFound(String),

    /// A 1-based page number outside the listing was requested
    #[error("page {page} is out of range (listing has {total} pages)")]
    PageOutOfRange {
        /// The requested page (1-based)
        page: u32,
        /// Number of pages in the listing
        total: u32,
    },

    /// The song detail page advertised no downloadable audio
    #[error("no audio links found on {url}")]
    NoAudioFound {
        /// The detail page that was inspected
        url: String,
    },

    /// A destination filename could not be derived from an audio URL
    #[error("cannot derive a file name from {url}")]
    InvalidFilename {
        /// The offending audio URL
        url: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Markup structure errors raised by the catalog parser
#[derive(Debug, Error)]
pub enum ParseError {
    /// A required container element is absent from the page
    #[error("missing container `{selector}`")]
    MissingContainer {
        /// CSS selector of the container that was expected
        selector: &'static str,
    },

    /// The pagination block exists but its last link carries no page number
    #[error("pagination link `{href}` has no page number")]
    InvalidPageIndex {
        /// The href of the last pagination link
        href: String,
    },

    /// A built-in CSS selector failed to compile
    #[error("invalid selector `{0}`")]
    Selector(&'static str),
}

impl Error {
    /// Transport failures, bad statuses, empty bodies and timeouts; the caller may retry
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Status { .. }
                | Error::EmptyBody { .. }
                | Error::Timeout { .. }
        )
    }

    /// Lookups that reference something the catalog does not contain
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ArtistNotFound(_) | Error::PageOutOfRange { .. })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_reports_seconds() {
        let err = Error::Timeout {
            operation: "download of Rose (320).mp3".to_string(),
            after: Duration::from_secs(300),
        };
        assert_eq!(
            err.to_string(),
            "download of Rose (320).mp3 timed out after 300s"
        );
    }

    #[test]
    fn categories_are_disjoint() {
        let status = Error::Status {
            url: "https://music-fa.com".to_string(),
            status: 503,
        };
        assert!(status.is_network());
        assert!(!status.is_not_found());

        let missing = Error::ArtistNotFound("Masih".to_string());
        assert!(missing.is_not_found());
        assert!(!missing.is_network());

        let parse = Error::from(ParseError::MissingContainer {
            selector: "aside.rwr",
        });
        assert!(!parse.is_network());
        assert!(!parse.is_not_found());
        assert_eq!(parse.to_string(), "parse error: missing container `aside.rwr`");
    }
}
