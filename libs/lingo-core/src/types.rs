//! Core types for the deck player.

use serde::{Deserialize, Serialize};

/// Deck key used when the source file name yields nothing usable.
pub const DEFAULT_DECK_KEY: &str = "default";

/// Lowest familiarity a star rating can express.
pub const FAMILIARITY_MIN: f64 = 0.0;

/// Highest familiarity; auto-play bumps saturate here.
pub const FAMILIARITY_MAX: f64 = 5.0;

/// One vocabulary row of a deck.
///
/// Familiarity is not stored on the item: `familiarity_default` is only the
/// value embedded in the CSV and serves as a fallback for the store lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckItem {
    /// 1-based position among the non-blank rows of the source CSV.
    pub id: u32,
    pub word: String,
    pub example: String,
    pub translation: String,
    pub example_translation: String,
    pub familiarity_default: f64,
}

impl DeckItem {
    /// Primary text for a field.
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Word => &self.word,
            Field::Example => &self.example,
        }
    }

    /// Translation paired with a field.
    pub fn translation_for(&self, field: Field) -> &str {
        match field {
            Field::Word => &self.translation,
            Field::Example => &self.example_translation,
        }
    }
}

/// A loaded deck: items in original CSV order plus the key that scopes
/// familiarity persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub key: String,
    pub items: Vec<DeckItem>,
}

impl Deck {
    pub fn new(key: impl Into<String>, items: Vec<DeckItem>) -> Self {
        let key = key.into();
        let key = if key.trim().is_empty() {
            DEFAULT_DECK_KEY.to_string()
        } else {
            key
        };
        Self { key, items }
    }

    /// Deck with no items under the default key.
    pub fn empty() -> Self {
        Self::new(DEFAULT_DECK_KEY, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeckItem> {
        self.items.get(index)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::empty()
    }
}

/// Speakable column of a deck item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Word,
    Example,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Example => "example",
        }
    }
}

/// Column the displayed view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Original deck order.
    Ordinal,
    Familiarity,
}

impl Default for SortColumn {
    fn default() -> Self {
        Self::Ordinal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Asc
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Familiarity filter bounds. The two ends may arrive in either order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamiliarityRange {
    pub min: f64,
    pub max: f64,
}

impl FamiliarityRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bounds as `(low, high)`.
    pub fn normalized(&self) -> (f64, f64) {
        (self.min.min(self.max), self.min.max(self.max))
    }

    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.normalized();
        value >= lo && value <= hi
    }
}

impl Default for FamiliarityRange {
    fn default() -> Self {
        Self {
            min: FAMILIARITY_MIN,
            max: FAMILIARITY_MAX,
        }
    }
}

/// Options for one auto-play run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    pub include_words: bool,
    pub include_examples: bool,
    /// Speak the matching translation right after each primary utterance.
    pub include_translations: bool,
    pub shuffle: bool,
    pub loop_playback: bool,
    /// Draw a fresh permutation at the start of every lap after the first.
    pub reshuffle_each_lap: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            include_words: true,
            include_examples: true,
            include_translations: false,
            shuffle: false,
            loop_playback: false,
            reshuffle_each_lap: false,
        }
    }
}

/// Voice, speed and volume handed to the speech engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    /// Speed multiplier, 1.0 is the engine's normal rate.
    pub rate: f64,
    /// Volume in `0.0..=1.0`.
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            volume: 1.0,
            voice_id: None,
        }
    }
}

/// Voice advertised by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub locale: String,
}

/// UI colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Light
    }
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Persisted playback preferences (speech parameters plus auto-play toggles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    pub rate: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    pub include_words: bool,
    pub include_examples: bool,
    pub include_translations: bool,
    pub shuffle: bool,
    pub loop_playback: bool,
    #[serde(default)]
    pub reshuffle_each_lap: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        let options = PlaybackOptions::default();
        let speech = SpeechParams::default();
        Self {
            rate: speech.rate,
            volume: speech.volume,
            voice_id: speech.voice_id,
            include_words: options.include_words,
            include_examples: options.include_examples,
            include_translations: options.include_translations,
            shuffle: options.shuffle,
            loop_playback: options.loop_playback,
            reshuffle_each_lap: options.reshuffle_each_lap,
        }
    }
}

impl PlaybackSettings {
    pub fn options(&self) -> PlaybackOptions {
        PlaybackOptions {
            include_words: self.include_words,
            include_examples: self.include_examples,
            include_translations: self.include_translations,
            shuffle: self.shuffle,
            loop_playback: self.loop_playback,
            reshuffle_each_lap: self.reshuffle_each_lap,
        }
    }

    pub fn speech_params(&self) -> SpeechParams {
        SpeechParams {
            rate: self.rate,
            volume: self.volume,
            voice_id: self.voice_id.clone(),
        }
    }
}
