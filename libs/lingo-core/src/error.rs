//! Error types for lingo-core.

use thiserror::Error;

/// Result type alias using DeckError.
pub type Result<T> = std::result::Result<T, DeckError>;

/// Errors raised while building a deck from parsed CSV rows.
///
/// A failed build never touches the currently loaded deck.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("empty CSV")]
    EmptyCsv,

    #[error("CSV must include columns: word, example (missing `{column}`). Optional: translation, example_translation, familiarity.")]
    MissingColumn { column: &'static str },
}

/// Errors from a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from a speech engine adapter.
///
/// The playback sequencer treats these as a completed utterance.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),

    #[error("utterance failed: {0}")]
    Failed(String),

    #[error("utterance cancelled")]
    Cancelled,
}

/// Errors from deck session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no deck row at index {0}")]
    RowNotFound(usize),
}
