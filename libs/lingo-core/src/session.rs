//! Owned state for one study session.
//!
//! A `DeckSession` bundles the active deck, its display order, the
//! familiarity store, preferences and the auto-play sequencer. Loading a
//! deck replaces the deck and resets the view; a failed load changes nothing.

use crate::csv;
use crate::deck::{deck_key_from_file_name, DeckRepository};
use crate::error::{DeckError, SessionError};
use crate::familiarity::FamiliarityStore;
use crate::playback::{PlaybackJob, PlaybackOutcome, PlaybackSequencer};
use crate::preferences::Preferences;
use crate::speech::SpeechEngine;
use crate::store::KeyValueStore;
use crate::types::{
    Deck, DeckItem, FamiliarityRange, Field, PlaybackOptions, PlaybackSettings, SortSpec,
    FAMILIARITY_MAX, FAMILIARITY_MIN,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Result of a successful deck load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub deck_key: String,
    pub items: usize,
}

/// Exported deck contents and the file name to offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedDeck {
    pub file_name: String,
    pub contents: String,
}

pub struct DeckSession {
    repo: DeckRepository,
    familiarity: FamiliarityStore,
    preferences: Preferences,
    sequencer: PlaybackSequencer,
    range: FamiliarityRange,
    sort: SortSpec,
    view_stale: bool,
}

impl DeckSession {
    pub fn new(store: Arc<dyn KeyValueStore>, speech: Arc<dyn SpeechEngine>) -> Self {
        let familiarity = FamiliarityStore::new(Arc::clone(&store));
        let preferences = Preferences::new(store);
        let sequencer = PlaybackSequencer::new(speech, familiarity.clone());

        match preferences.playback_settings() {
            Ok(settings) => sequencer.set_speech_params(settings.speech_params()),
            Err(e) => tracing::warn!(error = %e, "using default playback settings"),
        }

        Self {
            repo: DeckRepository::new(),
            familiarity,
            preferences,
            sequencer,
            range: FamiliarityRange::default(),
            sort: SortSpec::default(),
            view_stale: true,
        }
    }

    /// Parse and load a deck. On error the current deck is left untouched.
    pub fn load_csv(&mut self, text: &str, file_name: &str) -> Result<LoadSummary, DeckError> {
        let deck_key = deck_key_from_file_name(file_name);
        let rows = csv::parse(text);
        let deck = DeckRepository::build_deck(&rows, &deck_key).map_err(|e| {
            tracing::warn!(file_name, error = %e, "rejected deck");
            e
        })?;

        let summary = LoadSummary {
            deck_key: deck.key.clone(),
            items: deck.len(),
        };
        self.set_deck(deck);
        tracing::info!(deck = %summary.deck_key, items = summary.items, "deck loaded");
        Ok(summary)
    }

    /// Replace the deck, stopping any run over the previous one.
    pub fn set_deck(&mut self, deck: Deck) {
        self.sequencer.stop();
        self.repo.set_deck(deck);
        self.view_stale = true;
    }

    pub fn deck(&self) -> &Deck {
        self.repo.deck()
    }

    pub fn deck_key(&self) -> &str {
        self.repo.deck_key()
    }

    pub fn row(&self, index: usize) -> Option<&DeckItem> {
        self.repo.row(index)
    }

    pub fn familiarity(&self) -> &FamiliarityStore {
        &self.familiarity
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn sequencer(&self) -> &PlaybackSequencer {
        &self.sequencer
    }

    /// Current familiarity of the row at `index`.
    pub fn familiarity_of(&self, index: usize) -> Option<f64> {
        self.row(index)
            .map(|item| self.familiarity.get(self.deck_key(), item.id, item.familiarity_default))
    }

    /// Store a manual rating, clamped to the star range.
    pub fn rate_item(&mut self, index: usize, value: f64) -> Result<f64, SessionError> {
        let id = self.row(index).map(|item| item.id).ok_or(SessionError::RowNotFound(index))?;
        let value = value.clamp(FAMILIARITY_MIN, FAMILIARITY_MAX);
        self.familiarity.set(self.deck_key(), id, value)?;
        self.view_stale = true;
        Ok(value)
    }

    pub fn filter(&self) -> FamiliarityRange {
        self.range
    }

    pub fn set_filter(&mut self, range: FamiliarityRange) {
        self.range = range;
        self.view_stale = true;
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.view_stale = true;
    }

    /// Recompute the display order from the deck, filter and sort.
    pub fn refresh_view(&mut self) -> &[usize] {
        let order = crate::view::compute_view(
            self.repo.deck(),
            &self.familiarity,
            self.range,
            self.sort,
        );
        self.repo.set_filtered_order(order);
        self.view_stale = false;
        self.repo.filtered_indices()
    }

    /// Display order, recomputed only when deck, filter, sort or a rating changed.
    pub fn view(&mut self) -> &[usize] {
        if self.view_stale {
            return self.refresh_view();
        }
        self.repo.filtered_indices()
    }

    /// Adopt an externally chosen display order.
    pub fn set_view_order(&mut self, order: Vec<usize>) {
        self.repo.set_filtered_order(order);
        self.view_stale = false;
    }

    /// Export every item in deck order. `None` when the deck is empty.
    pub fn export(&self) -> Option<ExportedDeck> {
        let deck = self.repo.deck();
        if deck.is_empty() {
            return None;
        }
        let contents = csv::serialize(deck, |item| {
            self.familiarity.get(&deck.key, item.id, item.familiarity_default)
        });
        Some(ExportedDeck {
            file_name: csv::export_file_name(&deck.key),
            contents,
        })
    }

    pub fn playback_settings(&self) -> Result<PlaybackSettings, SessionError> {
        Ok(self.preferences.playback_settings()?)
    }

    /// Persist playback settings and apply their speech parameters immediately.
    pub fn save_playback_settings(&self, settings: &PlaybackSettings) -> Result<(), SessionError> {
        self.preferences.save_playback_settings(settings)?;
        self.sequencer.set_speech_params(settings.speech_params());
        Ok(())
    }

    /// Snapshot of the deck and display order for an auto-play run.
    pub fn playback_job(&mut self, options: PlaybackOptions) -> PlaybackJob {
        PlaybackJob {
            view: self.view().to_vec(),
            deck: self.repo.shared_deck(),
            options,
        }
    }

    /// Start auto-play over the current view on the tokio runtime.
    pub fn start_playback(&mut self, options: PlaybackOptions) -> JoinHandle<PlaybackOutcome> {
        let job = self.playback_job(options);
        self.sequencer.start(job)
    }

    pub fn stop_playback(&self) -> bool {
        self.sequencer.stop()
    }

    /// Future that speaks one cell once. It borrows nothing from the session.
    pub fn speak_cell(
        &self,
        index: usize,
        field: Field,
        include_translations: bool,
    ) -> Result<impl Future<Output = ()> + Send + 'static, SessionError> {
        let item = self.row(index).cloned().ok_or(SessionError::RowNotFound(index))?;
        let sequencer = self.sequencer.clone();
        Ok(async move {
            sequencer.speak_once(&item, field, include_translations).await;
        })
    }
}
