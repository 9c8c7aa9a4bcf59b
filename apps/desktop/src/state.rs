//! Application state.

use crate::config::AppConfig;
use crate::db::SqliteStore;
use crate::speech::engine_for;
use anyhow::Context;
use lingo_core::{DeckSession, KeyValueStore, PlaybackOutcome, SpeechEngine};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Global application state.
pub struct AppState {
    pub session: Arc<Mutex<DeckSession>>,
    pub store: Arc<SqliteStore>,
    pub speech: Arc<dyn SpeechEngine>,
    pub config: AppConfig,
    /// Handle of the most recent auto-play run.
    pub playback: Mutex<Option<JoinHandle<PlaybackOutcome>>>,
}

impl AppState {
    pub fn new(store: SqliteStore, speech: Arc<dyn SpeechEngine>, config: AppConfig) -> Self {
        let store = Arc::new(store);
        let kv: Arc<dyn KeyValueStore> = store.clone();
        let session = DeckSession::new(kv, Arc::clone(&speech));
        Self {
            session: Arc::new(Mutex::new(session)),
            store,
            speech,
            config,
            playback: Mutex::new(None),
        }
    }

    /// Open the database and speech engine named by `config`.
    pub fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        tracing::info!(path = %config.db_path.display(), "opening database");
        let store = SqliteStore::open(&config.db_path)
            .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;

        tracing::info!(program = ?config.speech_program, "speech engine selected");
        let speech = engine_for(config.speech_program);
        Ok(Self::new(store, speech, config))
    }
}
