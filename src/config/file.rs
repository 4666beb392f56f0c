//! TOML configuration file loading
//!
//! Supports `~/.config/voice-front/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Speech output and listening
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Assistant identity and command parsing
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// API keys for cloud speech
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// HTTP server
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Voice configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Speak responses aloud
    pub speak: Option<bool>,

    /// Accept voice input
    pub listen: Option<bool>,

    /// Preferred language for the native voice (e.g. "en")
    pub language: Option<String>,

    /// Native voice to select by position
    pub voice_index: Option<usize>,

    /// Cloud TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Agent name, also the base wake word
    pub name: Option<String>,

    pub languages: Option<Vec<String>>,

    /// Explicit wake words; derived from the name when absent
    pub wake_words: Option<Vec<String>>,

    pub confirmation_phrases: Option<Vec<String>>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    config_file_path().map_or_else(ConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voice-front/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voice-front").join("config.toml"))
}
