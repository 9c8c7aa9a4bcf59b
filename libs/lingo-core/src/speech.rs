//! Text-to-speech capability.
//!
//! The core never synthesises audio itself. It sequences calls to a
//! [`SpeechEngine`] adapter supplied by the host.

use crate::error::SpeechError;
use crate::types::{DeckItem, Field, SpeechParams, Voice};
use async_trait::async_trait;

/// Voice name preferred when choosing a default voice.
pub const DEFAULT_VOICE_NAME_HINT: &str = "Anna";

/// Locale preferred when no voice matches the name hint.
pub const DEFAULT_VOICE_LOCALE_HINT: &str = "de-DE";

/// A speech engine adapter.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Speak `text` and resolve once the engine reports completion.
    async fn speak(&self, text: &str, params: &SpeechParams) -> Result<(), SpeechError>;

    /// Abort any in-flight utterance.
    fn cancel(&self);

    /// Voices the engine can speak with.
    async fn list_voices(&self) -> Vec<Voice>;
}

/// Engine for hosts without speech support. Every utterance completes at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

#[async_trait]
impl SpeechEngine for NullSpeech {
    async fn speak(&self, _text: &str, _params: &SpeechParams) -> Result<(), SpeechError> {
        Ok(())
    }

    fn cancel(&self) {}

    async fn list_voices(&self) -> Vec<Voice> {
        Vec::new()
    }
}

/// Texts spoken for one field of an item, in order.
///
/// The primary text comes first; the paired translation follows when
/// requested and non-empty. Blank texts are skipped.
pub fn utterances(item: &DeckItem, field: Field, include_translations: bool) -> Vec<&str> {
    let mut parts = vec![item.text(field)];
    if include_translations {
        parts.push(item.translation_for(field));
    }
    parts.retain(|text| !text.trim().is_empty());
    parts
}

/// Speak one field of an item, one utterance after another.
///
/// Engine failures are logged and treated as completion so the caller can
/// always advance. `is_cancelled` is checked before each utterance; a
/// cancelled utterance or a raised flag ends the item early. Returns `false`
/// when the item was cut short.
pub async fn speak_item<F>(
    engine: &dyn SpeechEngine,
    item: &DeckItem,
    field: Field,
    params: &SpeechParams,
    include_translations: bool,
    is_cancelled: F,
) -> bool
where
    F: Fn() -> bool,
{
    for text in utterances(item, field, include_translations) {
        if is_cancelled() {
            return false;
        }
        match engine.speak(text, params).await {
            Ok(()) => {}
            Err(SpeechError::Cancelled) => return false,
            Err(e) => {
                tracing::warn!(item_id = item.id, field = field.as_str(), error = %e, "utterance failed");
            }
        }
    }
    true
}

/// Pick the default voice: name hint first, then locale prefix, then the first voice.
pub fn pick_default_voice<'a>(
    voices: &'a [Voice],
    name_hint: &str,
    locale_hint: &str,
) -> Option<&'a Voice> {
    let locale_hint = locale_hint.to_lowercase();
    voices
        .iter()
        .rev()
        .find(|v| v.name.contains(name_hint))
        .or_else(|| {
            voices
                .iter()
                .rev()
                .find(|v| v.locale.to_lowercase().starts_with(&locale_hint))
        })
        .or_else(|| voices.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> DeckItem {
        DeckItem {
            id: 1,
            word: "sein".into(),
            example: "Ich bin müde.".into(),
            translation: "to be".into(),
            example_translation: " ".into(),
            familiarity_default: 0.0,
        }
    }

    fn voice(id: &str, name: &str, locale: &str) -> Voice {
        Voice {
            id: id.into(),
            name: name.into(),
            locale: locale.into(),
        }
    }

    #[test]
    fn utterances_append_translation_when_enabled() {
        assert_eq!(utterances(&item(), Field::Word, true), vec!["sein", "to be"]);
        assert_eq!(utterances(&item(), Field::Word, false), vec!["sein"]);
    }

    #[test]
    fn utterances_skip_blank_text() {
        assert_eq!(utterances(&item(), Field::Example, true), vec!["Ich bin müde."]);
        let mut blank = item();
        blank.word.clear();
        assert!(utterances(&blank, Field::Word, false).is_empty());
    }

    /// Reports every utterance as cut off by `cancel`.
    struct CancelledSpeech {
        spoken: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechEngine for CancelledSpeech {
        async fn speak(&self, text: &str, _params: &SpeechParams) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Err(SpeechError::Cancelled)
        }

        fn cancel(&self) {}

        async fn list_voices(&self) -> Vec<Voice> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn cancelled_utterance_ends_the_item() {
        let engine = CancelledSpeech {
            spoken: std::sync::Mutex::new(Vec::new()),
        };
        let params = SpeechParams::default();
        let finished = speak_item(&engine, &item(), Field::Word, &params, true, || false).await;
        assert!(!finished);
        assert_eq!(*engine.spoken.lock().unwrap(), vec!["sein"]);
    }

    #[tokio::test]
    async fn raised_flag_skips_remaining_utterances() {
        let finished =
            speak_item(&NullSpeech, &item(), Field::Word, &SpeechParams::default(), true, || true)
                .await;
        assert!(!finished);
        assert!(speak_item(&NullSpeech, &item(), Field::Word, &SpeechParams::default(), true, || false).await);
    }

    #[test]
    fn default_voice_prefers_name_then_locale() {
        let voices = vec![
            voice("1", "Alex", "en-US"),
            voice("2", "Markus", "de-DE"),
            voice("3", "Anna", "de-DE"),
        ];
        let picked = pick_default_voice(&voices, DEFAULT_VOICE_NAME_HINT, DEFAULT_VOICE_LOCALE_HINT);
        assert_eq!(picked.map(|v| v.id.as_str()), Some("3"));

        let picked = pick_default_voice(&voices[..2], DEFAULT_VOICE_NAME_HINT, "DE-de");
        assert_eq!(picked.map(|v| v.id.as_str()), Some("2"));

        let picked = pick_default_voice(&voices[..1], DEFAULT_VOICE_NAME_HINT, "fr-FR");
        assert_eq!(picked.map(|v| v.id.as_str()), Some("1"));

        assert!(pick_default_voice(&[], "x", "y").is_none());
    }
}
