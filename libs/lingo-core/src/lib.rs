//! Core of the LingoFlow deck player.
//!
//! Provides:
//! - Pipe-separated CSV parsing and comma-separated export
//! - Familiarity persistence over an injected key-value store
//! - Deck construction with header validation
//! - Filtered/sorted display order
//! - The auto-play sequencer driving an injected speech engine
//! - `DeckSession`, the owned state object tying these together

pub mod csv;
pub mod deck;
pub mod error;
pub mod familiarity;
pub mod playback;
pub mod preferences;
pub mod session;
pub mod speech;
pub mod store;
pub mod types;
pub mod view;

pub use deck::{deck_key_from_file_name, DeckRepository};
pub use error::{DeckError, Result, SessionError, SpeechError, StoreError};
pub use familiarity::{FamiliarityStore, APP_PREFIX, AUTOPLAY_BUMP};
pub use playback::{
    build_queue, pacing_delay, ActiveItem, PlaybackJob, PlaybackOutcome, PlaybackSequencer,
    PlaybackState, QueueItem,
};
pub use preferences::Preferences;
pub use session::{DeckSession, ExportedDeck, LoadSummary};
pub use speech::{pick_default_voice, NullSpeech, SpeechEngine};
pub use store::{KeyValueStore, MemoryStore};
pub use types::{
    Deck, DeckItem, FamiliarityRange, Field, PlaybackOptions, PlaybackSettings, SortColumn,
    SortDirection, SortSpec, SpeechParams, Theme, Voice, DEFAULT_DECK_KEY, FAMILIARITY_MAX,
    FAMILIARITY_MIN,
};
pub use view::compute_view;
