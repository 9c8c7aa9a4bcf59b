//! Auto-play and speech commands.
//!
//! The session lock is never held across an await.

use super::{lock_session, CommandError};
use crate::state::AppState;
use lingo_core::speech::{DEFAULT_VOICE_LOCALE_HINT, DEFAULT_VOICE_NAME_HINT};
use lingo_core::{
    pick_default_voice, ActiveItem, Field, PlaybackOptions, PlaybackOutcome, PlaybackState, Voice,
};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AutoplayStatus {
    pub state: PlaybackState,
    pub active: Option<ActiveItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VoiceList {
    pub voices: Vec<Voice>,
    pub default_voice_id: Option<String>,
}

fn poisoned() -> CommandError {
    CommandError {
        message: "playback handle lock poisoned".to_string(),
    }
}

/// Start auto-play over the current view. Returns `false` if a run is active.
pub async fn start_autoplay(options: PlaybackOptions, state: &AppState) -> Result<bool, CommandError> {
    let handle = {
        let mut session = lock_session(state)?;
        if session.sequencer().state() != PlaybackState::Idle {
            return Ok(false);
        }
        session.start_playback(options)
    };

    let mut slot = state.playback.lock().map_err(|_| poisoned())?;
    *slot = Some(handle);
    Ok(true)
}

/// Request a stop. Returns `false` if nothing was playing.
pub async fn stop_autoplay(state: &AppState) -> Result<bool, CommandError> {
    Ok(lock_session(state)?.stop_playback())
}

/// Wait for the latest run to end and report how it ended.
pub async fn wait_autoplay(state: &AppState) -> Result<Option<PlaybackOutcome>, CommandError> {
    let handle = state.playback.lock().map_err(|_| poisoned())?.take();
    let Some(handle) = handle else {
        return Ok(None);
    };
    let outcome = handle.await.map_err(|e| CommandError {
        message: format!("auto-play task failed: {}", e),
    })?;
    Ok(Some(outcome))
}

pub async fn autoplay_status(state: &AppState) -> Result<AutoplayStatus, CommandError> {
    let session = lock_session(state)?;
    let sequencer = session.sequencer();
    Ok(AutoplayStatus {
        state: sequencer.state(),
        active: sequencer.active_item(),
    })
}

/// Speak one cell once, interrupting any current utterance.
pub async fn speak_cell(
    index: usize,
    field: Field,
    include_translations: bool,
    state: &AppState,
) -> Result<(), CommandError> {
    let speak = lock_session(state)?.speak_cell(index, field, include_translations)?;
    speak.await;
    Ok(())
}

/// Voices of the configured engine, with the preferred default.
pub async fn list_voices(state: &AppState) -> Result<VoiceList, CommandError> {
    let voices = state.speech.list_voices().await;
    let default_voice_id = pick_default_voice(&voices, DEFAULT_VOICE_NAME_HINT, DEFAULT_VOICE_LOCALE_HINT)
        .map(|v| v.id.clone());
    Ok(VoiceList {
        voices,
        default_voice_id,
    })
}
