//! Environment configuration.

use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "LINGOFLOW_DB_PATH";
pub const SPEECH_PROGRAM_VAR: &str = "LINGOFLOW_SPEECH_PROGRAM";
pub const EXPORT_DIR_VAR: &str = "LINGOFLOW_EXPORT_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown speech program `{0}` (expected espeak-ng, say or none)")]
    UnknownSpeechProgram(String),
}

/// External program used for text-to-speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechProgram {
    EspeakNg,
    Say,
    None,
}

impl SpeechProgram {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "espeak-ng" | "espeak" => Ok(Self::EspeakNg),
            "say" => Ok(Self::Say),
            "none" | "" => Ok(Self::None),
            other => Err(ConfigError::UnknownSpeechProgram(other.to_string())),
        }
    }

    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Say
        } else {
            Self::EspeakNg
        }
    }

    pub fn binary(&self) -> Option<&'static str> {
        match self {
            Self::EspeakNg => Some("espeak-ng"),
            Self::Say => Some("say"),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub speech_program: SpeechProgram,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(DB_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let speech_program = match lookup(SPEECH_PROGRAM_VAR) {
            Some(value) => SpeechProgram::parse(&value)?,
            None => SpeechProgram::platform_default(),
        };

        let export_dir = lookup(EXPORT_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            db_path,
            speech_program,
            export_dir,
        })
    }
}

fn default_db_path() -> PathBuf {
    // Fall back to the working directory when there is no data dir
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lingoflow")
        .join("lingoflow.db")
}
