//! # musicfa-dl
//!
//! Browse and download music from a catalog site that is only exposed as HTML.
//!
//! ## Design Philosophy
//!
//! musicfa-dl is designed to be:
//! - **Transport-agnostic** - Sessions return views and notices; a chat front end renders them
//! - **Sensible defaults** - Works against the public site with zero configuration
//! - **Library-first** - No bot binding or process bootstrap, purely a Rust crate for embedding
//! - **Gentle on the site** - Catalog reads are memoized for two days
//!
//! ## Quick Start
//!
//! ```no_run
//! use musicfa_dl::{Catalog, Config, QualityPreference};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::new(Config::default())?;
//!
//!     let page = catalog.list_artists_page(1).await?;
//!     for artist in &page.entries {
//!         println!("{}", artist.name());
//!     }
//!
//!     let artist = catalog.resolve_artist_by_name("Masih").await?;
//!     let songs = catalog.list_songs_page(&artist, 1).await?;
//!     if let Some(song) = songs.entries.first() {
//!         let files = catalog.download(song, QualityPreference::from("320")).await?;
//!         println!("stored {files:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Sessions
//!
//! ```no_run
//! use musicfa_dl::{Catalog, Config, SessionEvent, SessionManager, UserId};
//! use musicfa_dl::session::{ListKind, MenuPayload};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = SessionManager::new(Catalog::new(Config::default())?);
//! let user = UserId(42);
//!
//! manager.start(user).await;
//! let event = SessionEvent::Callback(MenuPayload::PageNav { list: ListKind::Artists, page: 1 });
//! let reply = manager.dispatch(user, event).await;
//! println!("{:?}", reply.view);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Memoization of catalog reads
pub mod cache;
/// Catalog browsing and downloads (decomposed into focused submodules)
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Page and file fetching
pub mod fetcher;
/// Markup parsing
pub mod parser;
/// Retry logic with exponential backoff
pub mod retry;
/// Per-user navigation sessions
pub mod session;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use cache::{CacheKey, CatalogCache};
pub use catalog::{ArtistDownloadReport, AudioVariantMap, Catalog, SongOutcome};
pub use config::Config;
pub use error::{Error, ParseError, Result};
pub use fetcher::{Fetcher, HttpFetcher};
pub use session::{Notice, Reply, Route, Session, SessionEvent, SessionManager, View};
pub use types::{Artist, Page, QualityPreference, QualityTier, Song, UserId};
