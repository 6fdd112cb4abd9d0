//! Per-user navigation state machine
//!
//! A [`Session`] walks one user from artist discovery to downloads:
//!
//! ```text
//!             PageNav(artists)            PageNav(songs)
//!               ┌────────┐                  ┌────────┐
//!               ▼        │                  ▼        │
//!  start ──► ArtistList ─┴─ Artist ──────► SongList ─┴─ Song ──► Downloading
//!               │                            ▲                       │
//!          ArtistInput                       │                       │
//!               ▼                            │      success/failure  │
//!           ArtistInput ── Text(exact name) ─┘  ◄────────────────────┘
//!
//!  any route ── Exit ──► Exited (terminal)
//! ```
//!
//! Failures never advance the route: they surface as [`Notice`]s and the
//! session stays where it was. Events that make no sense in the current route
//! are ignored.

pub mod manager;
pub mod menu;


pub use manager::SessionManager;
pub use menu::{Button, ListKind, Menu, MenuPayload};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::types::{Artist, QualityPreference, Song, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{Instrument, Span, debug, info, info_span, warn};

/// Where a session is in the browse/download flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Browsing the artist list (also the state after the welcome menu)
    ArtistList,
    /// Waiting for an artist name as free text
    ArtistInput,
    /// Browsing the selected artist's songs
    SongList,
    /// A download is in flight
    Downloading,
    /// The session ended; every further event is ignored
    Exited,
}

/// Input delivered to a session by the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A menu button was pressed
    Callback(MenuPayload),
    /// Free text was typed
    Text(String),
    /// The exit command was issued
    ExitCommand,
}

/// What the transport should display after an event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// Session start menu
    Welcome(Menu),
    /// One page of the artist list
    ArtistPage(Menu),
    /// Prompt for an artist name
    ArtistPrompt(Menu),
    /// One page of the selected artist's songs
    SongPage {
        /// The selected artist
        artist: Artist,
        /// Song buttons and navigation
        menu: Menu,
    },
    /// Files ready to be sent to the user
    Delivered {
        /// The song that was downloaded
        song: Song,
        /// Stored audio files
        files: Vec<PathBuf>,
    },
    /// Goodbye message; the session is over
    Farewell,
}

/// Side messages accompanying a view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The typed name matches no artist
    ArtistNotFound(String),
    /// One-time hint after the first delivery of a session
    DownloadInformed,
    /// A download failed; the song list stays available
    DownloadFailed {
        /// The song that failed
        song: Song,
        /// Human-readable cause
        reason: String,
    },
    /// The site could not be reached or answered with an error
    Unavailable(String),
    /// The site markup could not be understood
    SiteChanged(String),
}

impl Notice {
    /// Default English rendering
    pub fn text(&self) -> String {
        match self {
            Notice::ArtistNotFound(name) => {
                format!("No artist named \"{name}\" was found. Please enter the name again.")
            }
            Notice::DownloadInformed => "Song downloaded. You can pick more songs from the list \
                 above, or press Exit to leave."
                .to_string(),
            Notice::DownloadFailed { song, reason } => {
                format!("Downloading \"{}\" failed ({reason}). Please try again.", song.name())
            }
            Notice::Unavailable(reason) => {
                format!("The music site is not reachable right now ({reason}).")
            }
            Notice::SiteChanged(reason) => {
                format!("The music site returned a page that could not be read ({reason}).")
            }
        }
    }
}

/// Outcome of handling one event
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    /// New main view, if it changed
    pub view: Option<View>,
    /// Messages to show alongside
    pub notices: Vec<Notice>,
}

impl Reply {
    fn view(view: View) -> Self {
        Self {
            view: Some(view),
            notices: Vec::new(),
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            view: None,
            notices: vec![notice],
        }
    }
}

/// Holds a route for the duration of a step and puts `restore` back on drop,
/// also when the step's future is dropped before completing
struct RouteGuard<'a> {
    route: &'a mut Route,
    restore: Route,
}

impl<'a> RouteGuard<'a> {
    fn enter(route: &'a mut Route, during: Route, restore: Route) -> Self {
        *route = during;
        Self { route, restore }
    }
}

impl Drop for RouteGuard<'_> {
    fn drop(&mut self) {
        *self.route = self.restore;
    }
}

fn notice_for(error: &Error) -> Notice {
    match error {
        Error::Parse(_) => Notice::SiteChanged(error.to_string()),
        _ => Notice::Unavailable(error.to_string()),
    }
}

/// One user's navigation state
#[derive(Debug)]
pub struct Session {
    user_id: UserId,
    route: Route,
    selected_artist: Option<Artist>,
    download_informed: bool,
    artist_page: Option<u32>,
    song_page: Option<u32>,
    quality: QualityPreference,
    started_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    span: Span,
}

impl Session {
    /// Start a session for `user_id`, downloading in `quality` by default
    pub fn new(user_id: UserId, quality: QualityPreference) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            route: Route::ArtistList,
            selected_artist: None,
            download_informed: false,
            artist_page: None,
            song_page: None,
            quality,
            started_at: now,
            last_active: now,
            span: info_span!("session", user_id = user_id.get()),
        }
    }

    /// Welcome view shown when the session starts
    pub fn welcome(&self) -> Reply {
        self.span.in_scope(|| info!("Session started"));
        Reply::view(View::Welcome(menu::welcome_menu()))
    }

    /// Owner of the session
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Current route
    pub fn route(&self) -> Route {
        self.route
    }

    /// Artist whose songs are being browsed
    pub fn selected_artist(&self) -> Option<&Artist> {
        self.selected_artist.as_ref()
    }

    /// Whether the one-time download hint was already shown
    pub fn download_informed(&self) -> bool {
        self.download_informed
    }

    /// Currently displayed artist page, if any
    pub fn artist_page(&self) -> Option<u32> {
        self.artist_page
    }

    /// Currently displayed song page, if any
    pub fn song_page(&self) -> Option<u32> {
        self.song_page
    }

    /// Quality requested for downloads
    pub fn quality(&self) -> QualityPreference {
        self.quality
    }

    /// Change the quality requested for later downloads
    pub fn set_quality(&mut self, quality: QualityPreference) {
        self.quality = quality;
    }

    /// When the session started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the session last handled an event
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Whether the session has ended
    pub fn is_exited(&self) -> bool {
        self.route == Route::Exited
    }

    /// Whether handling `event` will hit the network
    ///
    /// A transport can use this to show a "fetching" message before calling
    /// [`Session::handle`] on a cold cache.
    pub fn needs_fetch(&self, catalog: &Catalog, event: &SessionEvent) -> bool {
        match (self.route, event) {
            (
                Route::ArtistList,
                SessionEvent::Callback(MenuPayload::PageNav {
                    list: ListKind::Artists,
                    ..
                }),
            )
            | (Route::ArtistInput, SessionEvent::Text(_)) => !catalog.artists_cached(),
            (
                Route::ArtistList | Route::ArtistInput,
                SessionEvent::Callback(MenuPayload::Artist(artist)),
            ) => !catalog.songs_cached(artist),
            (
                Route::SongList,
                SessionEvent::Callback(MenuPayload::PageNav {
                    list: ListKind::Songs,
                    ..
                }),
            ) => self
                .selected_artist
                .as_ref()
                .is_some_and(|artist| !catalog.songs_cached(artist)),
            (Route::SongList, SessionEvent::Callback(MenuPayload::Song(_))) => true,
            _ => false,
        }
    }

    /// Handle one event and return what to display
    pub async fn handle(&mut self, catalog: &Catalog, event: SessionEvent) -> Reply {
        let span = self.span.clone();
        self.last_active = Utc::now();
        self.dispatch(catalog, event).instrument(span).await
    }

    async fn dispatch(&mut self, catalog: &Catalog, event: SessionEvent) -> Reply {
        use MenuPayload as P;
        use SessionEvent as E;

        match (self.route, event) {
            (Route::Exited, event) => {
                debug!(?event, "Ignoring event for exited session");
                Reply::default()
            }
            (_, E::ExitCommand | E::Callback(P::Exit)) => self.exit(),

            (
                Route::ArtistList,
                E::Callback(P::PageNav {
                    list: ListKind::Artists,
                    page,
                }),
            ) => self.show_artist_page(catalog, page).await,
            (Route::ArtistList, E::Callback(P::ArtistInput)) => {
                self.route = Route::ArtistInput;
                info!("Waiting for artist name");
                Reply::view(View::ArtistPrompt(menu::exit_menu()))
            }
            (Route::ArtistList | Route::ArtistInput, E::Callback(P::Artist(artist))) => {
                info!(artist = %artist.name(), "Artist chosen from list");
                self.select_artist(catalog, artist).await
            }
            (Route::ArtistInput, E::Text(text)) => {
                match catalog.resolve_artist_by_name(&text).await {
                    Ok(artist) => {
                        info!(artist = %artist.name(), "Artist chosen by name");
                        self.select_artist(catalog, artist).await
                    }
                    Err(Error::ArtistNotFound(name)) => {
                        info!(name = %name, "No artist with this name");
                        Reply::notice(Notice::ArtistNotFound(name))
                    }
                    Err(e) => {
                        warn!(error = %e, "Artist lookup failed");
                        Reply::notice(notice_for(&e))
                    }
                }
            }

            (
                Route::SongList,
                E::Callback(P::PageNav {
                    list: ListKind::Songs,
                    page,
                }),
            ) => self.show_song_page(catalog, page).await,
            (Route::SongList, E::Callback(P::Song(song))) => self.download(catalog, song).await,

            (route, event) => {
                debug!(?route, ?event, "Ignoring event not valid in this route");
                Reply::default()
            }
        }
    }

    fn exit(&mut self) -> Reply {
        self.route = Route::Exited;
        info!("Session exited");
        Reply::view(View::Farewell)
    }

    async fn show_artist_page(&mut self, catalog: &Catalog, page: u32) -> Reply {
        match catalog.list_artists_page(page).await {
            Ok(listing) => {
                self.artist_page = Some(listing.page);
                debug!(page, total = listing.total_pages, "Showing artist page");
                Reply::view(View::ArtistPage(menu::page_menu(&listing, ListKind::Artists)))
            }
            Err(Error::PageOutOfRange { page, total }) => {
                // The displayed page stays valid; nothing to redraw
                debug!(page, total, current = ?self.artist_page, "Ignoring stale artist page request");
                Reply::default()
            }
            Err(e) => {
                warn!(page, error = %e, "Failed to list artists");
                Reply::notice(notice_for(&e))
            }
        }
    }

    async fn select_artist(&mut self, catalog: &Catalog, artist: Artist) -> Reply {
        match catalog.list_songs_page(&artist, 1).await {
            Ok(listing) => {
                self.route = Route::SongList;
                self.song_page = Some(1);
                let menu = menu::page_menu(&listing, ListKind::Songs);
                self.selected_artist = Some(artist.clone());
                Reply::view(View::SongPage { artist, menu })
            }
            Err(e) => {
                warn!(artist = %artist.name(), error = %e, "Failed to list songs");
                Reply::notice(notice_for(&e))
            }
        }
    }

    async fn show_song_page(&mut self, catalog: &Catalog, page: u32) -> Reply {
        let Some(artist) = self.selected_artist.clone() else {
            warn!("Song list route without a selected artist");
            return Reply::default();
        };
        match catalog.list_songs_page(&artist, page).await {
            Ok(listing) => {
                self.song_page = Some(listing.page);
                debug!(artist = %artist.name(), page, total = listing.total_pages, "Showing song page");
                let menu = menu::page_menu(&listing, ListKind::Songs);
                Reply::view(View::SongPage { artist, menu })
            }
            Err(Error::PageOutOfRange { page, total }) => {
                debug!(page, total, current = ?self.song_page, "Ignoring stale song page request");
                Reply::default()
            }
            Err(e) => {
                warn!(artist = %artist.name(), page, error = %e, "Failed to list songs");
                Reply::notice(notice_for(&e))
            }
        }
    }

    async fn download(&mut self, catalog: &Catalog, song: Song) -> Reply {
        let quality = self.quality;
        let budget = catalog.get_config().download.delivery_timeout;
        info!(song = %song.name(), ?quality, "Download requested");

        let result = {
            let _downloading =
                RouteGuard::enter(&mut self.route, Route::Downloading, Route::SongList);
            match tokio::time::timeout(budget, catalog.download(&song, quality)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    operation: format!("delivery of {}", song.name()),
                    after: budget,
                }),
            }
        };

        match result {
            Ok(files) => {
                info!(song = %song.name(), files = files.len(), "Download delivered");
                let mut reply = Reply::view(View::Delivered { song, files });
                if !self.download_informed {
                    self.download_informed = true;
                    reply.notices.push(Notice::DownloadInformed);
                }
                reply
            }
            Err(e) => {
                warn!(song = %song.name(), error = %e, "Download failed");
                Reply::notice(Notice::DownloadFailed {
                    song,
                    reason: e.to_string(),
                })
            }
        }
    }
}
