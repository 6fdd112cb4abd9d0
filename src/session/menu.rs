//! Transport-agnostic button grids
//!
//! A front end renders a [`Menu`] as whatever its chat platform offers (inline
//! keyboards, quick replies) and feeds the pressed button's [`MenuPayload`] back
//! as a [`super::SessionEvent::Callback`].

use crate::types::{Artist, Page, Song};
use serde::{Deserialize, Serialize};

/// Which paginated list a navigation button belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// The artist list
    Artists,
    /// The selected artist's song list
    Songs,
}

/// Data carried by a menu button
///
/// Navigation buttons carry the absolute target page, never a relative step,
/// so a stale button still names a well-defined page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuPayload {
    /// Select this artist
    Artist(Artist),
    /// Download this song
    Song(Song),
    /// Show page `page` of `list`
    PageNav {
        /// The list being paged
        list: ListKind,
        /// 1-based target page
        page: u32,
    },
    /// Ask for an artist name as free text
    ArtistInput,
    /// End the session
    Exit,
}

/// One button: a label and what pressing it means
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Text shown to the user
    pub label: String,
    /// Payload sent back when pressed
    pub payload: MenuPayload,
}

impl Button {
    /// Create a button
    pub fn new(label: impl Into<String>, payload: MenuPayload) -> Self {
        Self {
            label: label.into(),
            payload,
        }
    }
}

/// Rows of buttons, top to bottom
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    /// Button rows
    pub rows: Vec<Vec<Button>>,
}

impl Menu {
    /// Every button, row by row
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Whether some button carries `payload`
    pub fn offers(&self, payload: &MenuPayload) -> bool {
        self.buttons().any(|button| &button.payload == payload)
    }
}

/// Label for the previous-page button
pub const PREV_LABEL: &str = "<--";
/// Label for the next-page button
pub const NEXT_LABEL: &str = "-->";
/// Label for the exit button
pub const EXIT_LABEL: &str = "Exit";

/// An entity that can be offered as a menu button
pub trait MenuEntry {
    /// Button label
    fn label(&self) -> &str;
    /// Payload selecting this entity
    fn payload(&self) -> MenuPayload;
}

impl MenuEntry for Artist {
    fn label(&self) -> &str {
        self.name()
    }

    fn payload(&self) -> MenuPayload {
        MenuPayload::Artist(self.clone())
    }
}

impl MenuEntry for Song {
    fn label(&self) -> &str {
        self.name()
    }

    fn payload(&self) -> MenuPayload {
        MenuPayload::Song(self.clone())
    }
}

fn exit_button() -> Button {
    Button::new(EXIT_LABEL, MenuPayload::Exit)
}

/// First menu of a session: list artists, or type an artist name
pub fn welcome_menu() -> Menu {
    Menu {
        rows: vec![vec![
            Button::new(
                "List artists",
                MenuPayload::PageNav {
                    list: ListKind::Artists,
                    page: 1,
                },
            ),
            Button::new("Enter artist name", MenuPayload::ArtistInput),
        ]],
    }
}

/// Menu shown while waiting for free text: only an exit button
pub fn exit_menu() -> Menu {
    Menu {
        rows: vec![vec![exit_button()]],
    }
}

/// Button grid for one page of a listing
///
/// Entries go two per row (an odd last entry gets its own row), followed by a
/// navigation row `[prev?, exit, next?]`.
pub fn page_menu<T: MenuEntry>(page: &Page<T>, list: ListKind) -> Menu {
    let mut rows: Vec<Vec<Button>> = page
        .entries
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|entry| Button::new(entry.label(), entry.payload()))
                .collect()
        })
        .collect();

    let mut nav = Vec::with_capacity(3);
    if page.has_prev() {
        nav.push(Button::new(
            PREV_LABEL,
            MenuPayload::PageNav {
                list,
                page: page.page - 1,
            },
        ));
    }
    nav.push(exit_button());
    if page.has_next() {
        nav.push(Button::new(
            NEXT_LABEL,
            MenuPayload::PageNav {
                list,
                page: page.page + 1,
            },
        ));
    }
    rows.push(nav);

    Menu { rows }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn artists_page(count: usize, page: u32, total_pages: u32) -> Page<Artist> {
        Page {
            entries: (0..count)
                .map(|i| Artist::new(format!("A{i}"), format!("https://music-fa.com/artist/a{i}/")))
                .collect(),
            page,
            total_pages,
        }
    }

    fn labels(row: &[Button]) -> Vec<&str> {
        row.iter().map(|button| button.label.as_str()).collect()
    }

    #[test]
    fn entries_two_per_row_with_odd_tail() {
        let menu = page_menu(&artists_page(5, 1, 1), ListKind::Artists);
        assert_eq!(menu.rows.len(), 4);
        assert_eq!(labels(&menu.rows[0]), vec!["A0", "A1"]);
        assert_eq!(labels(&menu.rows[1]), vec!["A2", "A3"]);
        assert_eq!(labels(&menu.rows[2]), vec!["A4"]);
        assert_eq!(labels(&menu.rows[3]), vec![EXIT_LABEL], "single page: exit only");
    }

    #[test]
    fn first_page_has_no_prev() {
        let menu = page_menu(&artists_page(10, 1, 3), ListKind::Artists);
        let nav = menu.rows.last().unwrap();
        assert_eq!(labels(nav), vec![EXIT_LABEL, NEXT_LABEL]);
        assert_eq!(
            nav[1].payload,
            MenuPayload::PageNav {
                list: ListKind::Artists,
                page: 2
            }
        );
    }

    #[test]
    fn middle_page_has_both_directions() {
        let menu = page_menu(&artists_page(10, 2, 3), ListKind::Songs);
        let nav = menu.rows.last().unwrap();
        assert_eq!(labels(nav), vec![PREV_LABEL, EXIT_LABEL, NEXT_LABEL]);
        assert!(menu.offers(&MenuPayload::PageNav {
            list: ListKind::Songs,
            page: 1
        }));
        assert!(menu.offers(&MenuPayload::PageNav {
            list: ListKind::Songs,
            page: 3
        }));
    }

    #[test]
    fn last_page_has_no_next() {
        let menu = page_menu(&artists_page(3, 3, 3), ListKind::Artists);
        let nav = menu.rows.last().unwrap();
        assert_eq!(labels(nav), vec![PREV_LABEL, EXIT_LABEL]);
        assert!(!menu.offers(&MenuPayload::PageNav {
            list: ListKind::Artists,
            page: 4
        }));
    }

    #[test]
    fn payloads_are_tagged_on_the_wire() {
        let json = serde_json::to_value(MenuPayload::PageNav {
            list: ListKind::Songs,
            page: 3,
        })
        .unwrap();
        assert_eq!(json["type"], "page_nav");
        assert_eq!(json["list"], "songs");
        assert_eq!(json["page"], 3);

        let exit: MenuPayload = serde_json::from_str(r#"{"type":"exit"}"#).unwrap();
        assert_eq!(exit, MenuPayload::Exit);
    }

    #[test]
    fn welcome_offers_first_artist_page_and_name_input() {
        let menu = welcome_menu();
        assert!(menu.offers(&MenuPayload::PageNav {
            list: ListKind::Artists,
            page: 1
        }));
        assert!(menu.offers(&MenuPayload::ArtistInput));
    }
}
