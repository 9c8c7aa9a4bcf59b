//! Theme and playback settings commands.

use super::{lock_session, CommandError};
use crate::state::AppState;
use lingo_core::{PlaybackSettings, Theme};

/// Get persisted playback settings.
pub async fn get_playback_settings(state: &AppState) -> Result<PlaybackSettings, CommandError> {
    Ok(lock_session(state)?.playback_settings()?)
}

/// Save playback settings. Speech parameters apply to the next utterance.
pub async fn save_playback_settings(
    settings: PlaybackSettings,
    state: &AppState,
) -> Result<(), CommandError> {
    lock_session(state)?.save_playback_settings(&settings)?;
    Ok(())
}

pub async fn get_theme(state: &AppState) -> Result<Theme, CommandError> {
    Ok(lock_session(state)?.preferences().theme()?)
}

pub async fn set_theme(theme: Theme, state: &AppState) -> Result<(), CommandError> {
    lock_session(state)?.preferences().set_theme(theme)?;
    Ok(())
}

/// Flip between light and dark. Returns the new theme.
pub async fn toggle_theme(state: &AppState) -> Result<Theme, CommandError> {
    Ok(lock_session(state)?.preferences().toggle_theme()?)
}
