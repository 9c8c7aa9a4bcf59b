//! Commands exposed to the rendering layer.
//!
//! Every command takes the shared [`AppState`] and returns a serialisable
//! value or a [`CommandError`] carrying a display message.

pub mod deck;
pub mod familiarity;
pub mod playback;
pub mod settings;

use crate::state::AppState;
use lingo_core::DeckSession;
use std::sync::MutexGuard;

pub use deck::{export_deck, get_view, import_file, load_deck_text, set_filter, set_sort, set_view_order};
pub use familiarity::{get_rated_items, set_familiarity};
pub use playback::{autoplay_status, list_voices, speak_cell, start_autoplay, stop_autoplay, wait_autoplay};
pub use settings::{get_playback_settings, get_theme, save_playback_settings, set_theme, toggle_theme};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CommandError {
    pub message: String,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<crate::db::DbError> for CommandError {
    fn from(e: crate::db::DbError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<lingo_core::DeckError> for CommandError {
    fn from(e: lingo_core::DeckError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<lingo_core::SessionError> for CommandError {
    fn from(e: lingo_core::SessionError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<lingo_core::StoreError> for CommandError {
    fn from(e: lingo_core::StoreError) -> Self {
        Self { message: e.to_string() }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self { message: e.to_string() }
    }
}

/// Lock the session for the duration of a synchronous command body.
pub(crate) fn lock_session(state: &AppState) -> Result<MutexGuard<'_, DeckSession>, CommandError> {
    state.session.lock().map_err(|_| CommandError {
        message: "session lock poisoned".to_string(),
    })
}
