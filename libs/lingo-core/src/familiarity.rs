//! Per-item familiarity persisted in a key-value store.
//!
//! Keys have the form `<prefix>:fam:<deck key>:<item id>` and values are
//! decimal strings. A stored value always wins over the CSV-embedded default.

use crate::store::{KeyValueStore, StoreResult};
use crate::types::FAMILIARITY_MAX;
use std::sync::Arc;

/// Namespace for every key this application writes.
pub const APP_PREFIX: &str = "lingoflow";

/// Increment applied each time auto-play speaks an item.
pub const AUTOPLAY_BUMP: f64 = 0.1;

/// Familiarity lookups and updates scoped by deck key and item id.
#[derive(Clone)]
pub struct FamiliarityStore {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl FamiliarityStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_prefix(store, APP_PREFIX)
    }

    pub fn with_prefix(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Common prefix of every key belonging to one deck.
    pub fn deck_prefix(&self, deck_key: &str) -> String {
        format!("{}:fam:{}:", self.prefix, deck_key)
    }

    /// Composite store key for one item of one deck.
    pub fn key(&self, deck_key: &str, item_id: u32) -> String {
        format!("{}{}", self.deck_prefix(deck_key), item_id)
    }

    /// Stored familiarity, or `fallback` when nothing readable is stored.
    pub fn get(&self, deck_key: &str, item_id: u32, fallback: f64) -> f64 {
        let fallback = if fallback.is_finite() { fallback } else { 0.0 };
        let key = self.key(deck_key, item_id);

        match self.store.get(&key) {
            Ok(Some(raw)) => match parse_number(&raw) {
                Some(value) => value,
                None => {
                    tracing::warn!(%key, %raw, "ignoring unreadable familiarity value");
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!(%key, error = %e, "familiarity lookup failed, using fallback");
                fallback
            }
        }
    }

    /// Overwrite the stored familiarity.
    pub fn set(&self, deck_key: &str, item_id: u32, value: f64) -> StoreResult<()> {
        self.store
            .set(&self.key(deck_key, item_id), &value.to_string())
    }

    /// Add `delta` to the current value, capped at `max`, and store it.
    ///
    /// Returns the stored value.
    pub fn bump(
        &self,
        deck_key: &str,
        item_id: u32,
        delta: f64,
        fallback: f64,
        max: f64,
    ) -> StoreResult<f64> {
        let next = (self.get(deck_key, item_id, fallback) + delta).min(max);
        self.set(deck_key, item_id, next)?;
        Ok(next)
    }

    /// [`bump`](Self::bump) with the auto-play increment and the familiarity ceiling.
    pub fn bump_autoplay(&self, deck_key: &str, item_id: u32, fallback: f64) -> StoreResult<f64> {
        self.bump(deck_key, item_id, AUTOPLAY_BUMP, fallback, FAMILIARITY_MAX)
    }
}

/// Lenient numeric parse for CSV cells and stored values.
///
/// Blank text is `0`; anything that is not a finite number is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
