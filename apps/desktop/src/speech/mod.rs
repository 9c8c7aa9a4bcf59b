//! Speech engine backed by an external TTS program.
//!
//! Each utterance spawns `espeak-ng` or macOS `say` and resolves when the
//! process exits. `cancel` kills the in-flight process.

use crate::config::SpeechProgram;
use async_trait::async_trait;
use lingo_core::{NullSpeech, SpeechEngine, SpeechError, SpeechParams, Voice};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Notify;

/// Words per minute at rate 1.0.
const BASE_WORDS_PER_MINUTE: f64 = 175.0;

pub struct CommandSpeech {
    program: SpeechProgram,
    cancel: Notify,
}

impl CommandSpeech {
    pub fn new(program: SpeechProgram) -> Self {
        Self {
            program,
            cancel: Notify::new(),
        }
    }

    pub fn program(&self) -> SpeechProgram {
        self.program
    }
}

/// Build the engine for a configured program. `none` yields the null engine.
pub fn engine_for(program: SpeechProgram) -> Arc<dyn SpeechEngine> {
    match program {
        SpeechProgram::None => Arc::new(NullSpeech),
        other => Arc::new(CommandSpeech::new(other)),
    }
}

fn words_per_minute(rate: f64) -> u32 {
    let rate = if rate.is_finite() { rate } else { 1.0 };
    (BASE_WORDS_PER_MINUTE * rate).round().clamp(80.0, 450.0) as u32
}

/// Command-line arguments for one utterance.
pub fn speech_args(program: SpeechProgram, text: &str, params: &SpeechParams) -> Vec<String> {
    let mut args = Vec::new();
    match program {
        SpeechProgram::EspeakNg => {
            let volume = if params.volume.is_finite() { params.volume } else { 1.0 };
            args.push("-s".to_string());
            args.push(words_per_minute(params.rate).to_string());
            args.push("-a".to_string());
            args.push(((volume * 100.0).round().clamp(0.0, 200.0) as u32).to_string());
        }
        SpeechProgram::Say => {
            args.push("-r".to_string());
            args.push(words_per_minute(params.rate).to_string());
        }
        SpeechProgram::None => return args,
    }
    if let Some(voice) = params.voice_id.as_deref().filter(|v| !v.is_empty()) {
        args.push("-v".to_string());
        args.push(voice.to_string());
    }
    args.push(text.to_string());
    args
}

/// Parse `espeak-ng --voices` output.
pub fn parse_espeak_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 {
                return None;
            }
            Some(Voice {
                id: cols[1].to_string(),
                name: cols[3].replace('_', " "),
                locale: cols[1].to_string(),
            })
        })
        .collect()
}

/// Parse `say -v '?'` output, e.g. `Anna    de_DE    # Hallo, ich heiße Anna.`
pub fn parse_say_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim();
            let (name, locale) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Voice {
                id: name.to_string(),
                name: name.to_string(),
                locale: locale.replace('_', "-"),
            })
        })
        .collect()
}

#[async_trait]
impl SpeechEngine for CommandSpeech {
    async fn speak(&self, text: &str, params: &SpeechParams) -> Result<(), SpeechError> {
        let Some(binary) = self.program.binary() else {
            return Ok(());
        };
        if text.trim().is_empty() {
            return Ok(());
        }

        // Register for cancellation before the process exists
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let mut child = Command::new(binary)
            .args(speech_args(self.program, text, params))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::Unavailable(format!("{}: {}", binary, e)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| SpeechError::Failed(e.to_string()))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(SpeechError::Failed(format!("{} exited with {}", binary, status)))
                }
            }
            _ = &mut cancelled => {
                if let Err(e) = child.start_kill() {
                    tracing::debug!(error = %e, "speech process already gone");
                }
                if let Err(e) = child.wait().await {
                    tracing::debug!(error = %e, "failed to reap speech process");
                }
                Err(SpeechError::Cancelled)
            }
        }
    }

    fn cancel(&self) {
        self.cancel.notify_waiters();
    }

    async fn list_voices(&self) -> Vec<Voice> {
        let (binary, args, parse): (&str, &[&str], fn(&str) -> Vec<Voice>) = match self.program {
            SpeechProgram::EspeakNg => ("espeak-ng", &["--voices"], parse_espeak_voices),
            SpeechProgram::Say => ("say", &["-v", "?"], parse_say_voices),
            SpeechProgram::None => return Vec::new(),
        };

        match Command::new(binary).args(args).output().await {
            Ok(output) if output.status.success() => {
                parse(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::warn!(binary, status = %output.status, "voice listing failed");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(binary, error = %e, "voice listing unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn espeak_args_scale_rate_and_volume() {
        let params = SpeechParams {
            rate: 1.2,
            volume: 0.5,
            voice_id: Some("de".into()),
        };
        assert_eq!(
            speech_args(SpeechProgram::EspeakNg, "Hallo", &params),
            vec!["-s", "210", "-a", "50", "-v", "de", "Hallo"]
        );
    }

    #[test]
    fn say_args_clamp_rate() {
        let params = SpeechParams {
            rate: 0.1,
            ..SpeechParams::default()
        };
        assert_eq!(
            speech_args(SpeechProgram::Say, "Hallo", &params),
            vec!["-r", "80", "Hallo"]
        );
    }

    #[test]
    fn parses_espeak_listing() {
        let out = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                   5  de              --/M      German             gmw/de\n \
                   5  en-us           --/M      English_(America)  gmw/en-US            (en 3)\n";
        let voices = parse_espeak_voices(out);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].id, "de");
        assert_eq!(voices[1].name, "English (America)");
    }

    #[test]
    fn parses_say_listing() {
        let out = "Anna                de_DE    # Hallo, ich heiße Anna.\n\
                   Bad News            en_US    # The light you see.\n";
        let voices = parse_say_voices(out);
        assert_eq!(
            voices,
            vec![
                Voice {
                    id: "Anna".into(),
                    name: "Anna".into(),
                    locale: "de-DE".into()
                },
                Voice {
                    id: "Bad News".into(),
                    name: "Bad News".into(),
                    locale: "en-US".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn null_program_speaks_nothing() {
        let engine = CommandSpeech::new(SpeechProgram::None);
        assert!(engine.speak("Hallo", &SpeechParams::default()).await.is_ok());
        assert!(engine.list_voices().await.is_empty());
    }

    #[tokio::test]
    async fn blank_text_resolves_without_spawning() {
        let engine = CommandSpeech::new(SpeechProgram::EspeakNg);
        assert!(engine.speak("   ", &SpeechParams::default()).await.is_ok());
    }
}
