//! User preferences kept next to familiarity in the key-value store.

use crate::familiarity::APP_PREFIX;
use crate::store::{KeyValueStore, StoreResult};
use crate::types::{PlaybackSettings, Theme};
use std::sync::Arc;

/// Theme and playback preferences.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_prefix(store, APP_PREFIX)
    }

    pub fn with_prefix(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn theme_key(&self) -> String {
        format!("{}:theme", self.prefix)
    }

    pub fn playback_key(&self) -> String {
        format!("{}:playback", self.prefix)
    }

    /// Stored theme; `Light` when unset or unrecognised.
    pub fn theme(&self) -> StoreResult<Theme> {
        Ok(self
            .store
            .get(&self.theme_key())?
            .and_then(|raw| Theme::from_str(&raw))
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> StoreResult<()> {
        self.store.set(&self.theme_key(), theme.as_str())
    }

    /// Flip between light and dark and return the new theme.
    pub fn toggle_theme(&self) -> StoreResult<Theme> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Stored playback settings, or defaults when none were saved.
    pub fn playback_settings(&self) -> StoreResult<PlaybackSettings> {
        match self.store.get(&self.playback_key())? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(PlaybackSettings::default()),
        }
    }

    pub fn save_playback_settings(&self, settings: &PlaybackSettings) -> StoreResult<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.set(&self.playback_key(), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Preferences::new(store))
    }

    #[test]
    fn theme_defaults_to_light_and_toggles() {
        let (store, prefs) = prefs();
        assert_eq!(prefs.theme().unwrap(), Theme::Light);
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(store.get("lingoflow:theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn unknown_theme_reads_as_light() {
        let (store, prefs) = prefs();
        store.set("lingoflow:theme", "sepia").unwrap();
        assert_eq!(prefs.theme().unwrap(), Theme::Light);
    }

    #[test]
    fn playback_settings_round_trip() {
        let (_, prefs) = prefs();
        assert_eq!(prefs.playback_settings().unwrap(), PlaybackSettings::default());

        let settings = PlaybackSettings {
            rate: 0.8,
            voice_id: Some("de+f3".into()),
            loop_playback: true,
            ..PlaybackSettings::default()
        };
        prefs.save_playback_settings(&settings).unwrap();
        assert_eq!(prefs.playback_settings().unwrap(), settings);
    }

    #[test]
    fn corrupt_playback_settings_surface_an_error() {
        let (store, prefs) = prefs();
        store.set("lingoflow:playback", "{not json").unwrap();
        assert!(matches!(prefs.playback_settings(), Err(StoreError::Serialization(_))));
    }
}
