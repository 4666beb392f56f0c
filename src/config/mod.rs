//! Configuration management
//!
//! Read once at startup with priority env > TOML file > defaults, then
//! passed to constructors. Nothing reads configuration after that.

pub mod file;

use crate::command::{DEFAULT_CONFIRMATION_PHRASES, wake_words_for};
use crate::{Error, Result};

/// Agent name used when none is configured
pub const DEFAULT_AGENT_NAME: &str = "Jarvis";

/// Default HTTP bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Speech output and listening
    pub voice: VoiceConfig,

    /// Assistant identity and command parsing
    pub assistant: AssistantConfig,

    /// HTTP server
    pub server: ServerConfig,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Speak responses aloud
    pub speak: bool,

    /// Accept voice input
    pub listen: bool,

    /// Preferred language for the native voice
    pub language: String,

    /// Native voice to select by position
    pub voice_index: Option<usize>,

    /// Cloud TTS provider ("openai" or "elevenlabs")
    pub tts_provider: String,

    /// Cloud TTS model (e.g. "tts-1", "eleven_monolingual_v1")
    pub tts_model: String,

    /// Cloud TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// `OpenAI` API key (cloud TTS)
    pub openai_api_key: Option<String>,

    /// `ElevenLabs` API key (cloud TTS)
    pub elevenlabs_api_key: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            speak: true,
            listen: false,
            language: "en".to_string(),
            voice_index: None,
            tts_provider: "openai".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
            openai_api_key: None,
            elevenlabs_api_key: None,
        }
    }
}

/// Assistant identity and command parsing
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Agent name
    pub name: String,

    /// Languages the assistant understands, preferred first
    pub languages: Vec<String>,

    /// Wake words tested as utterance prefixes, in order
    pub wake_words: Vec<String>,

    /// Phrases that mark a command as confirmed, in order
    pub confirmation_phrases: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            languages: vec!["en".to_string()],
            wake_words: wake_words_for(DEFAULT_AGENT_NAME),
            confirmation_phrases: default_confirmation_phrases(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is unusable
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a blank agent name, an empty wake word
    /// list, or an unparseable environment value
    pub fn from_sources<E>(fc: file::ConfigFile, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = VoiceConfig::default();

        // Assistant (env > toml > default)
        let name = env("AGENT_NAME")
            .or(fc.assistant.name)
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string())
            .trim()
            .to_string();
        if name.is_empty() {
            return Err(Error::Config("agent name must not be blank".to_string()));
        }

        let languages = env("VOICE_LANGUAGES")
            .map(|v| split_list(&v))
            .or(fc.assistant.languages)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| vec!["en".to_string()]);

        // Wake words from the file win over ones derived from the name
        let wake_words = fc
            .assistant
            .wake_words
            .unwrap_or_else(|| wake_words_for(&name));
        if wake_words.is_empty() || wake_words.iter().any(|w| w.trim().is_empty()) {
            return Err(Error::Config(
                "wake words must be a non-empty list of non-blank phrases".to_string(),
            ));
        }

        let confirmation_phrases = fc
            .assistant
            .confirmation_phrases
            .unwrap_or_else(default_confirmation_phrases);

        // Voice (env > toml > default)
        let speak = env_flag(&env, "VOICE_SPEAK")?
            .or(fc.voice.speak)
            .unwrap_or(defaults.speak);
        let listen = env_flag(&env, "VOICE_LISTEN")?
            .or(fc.voice.listen)
            .unwrap_or(defaults.listen);

        let tts_provider = env("VOICE_TTS_PROVIDER")
            .or(fc.voice.tts_provider)
            .unwrap_or(defaults.tts_provider)
            .to_lowercase();
        let elevenlabs = tts_provider.starts_with("eleven");

        let voice = VoiceConfig {
            speak,
            listen,
            language: fc
                .voice
                .language
                .or_else(|| languages.first().cloned())
                .unwrap_or(defaults.language),
            voice_index: fc.voice.voice_index,
            tts_model: fc.voice.tts_model.unwrap_or_else(|| {
                if elevenlabs {
                    "eleven_monolingual_v1".to_string()
                } else {
                    defaults.tts_model
                }
            }),
            tts_voice: fc.voice.tts_voice.unwrap_or_else(|| {
                if elevenlabs {
                    // ElevenLabs "Rachel"
                    "21m00Tcm4TlvDq8ikWAM".to_string()
                } else {
                    defaults.tts_voice
                }
            }),
            tts_speed: fc.voice.tts_speed.unwrap_or(defaults.tts_speed),
            tts_provider,
            openai_api_key: env("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .filter(|k| !k.is_empty()),
            elevenlabs_api_key: env("ELEVENLABS_API_KEY")
                .or(fc.api_keys.elevenlabs)
                .filter(|k| !k.is_empty()),
        };

        // Server (env > toml > default)
        let port = env("PORT")
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|e| Error::Config(format!("invalid PORT {raw:?}: {e}")))
            })
            .transpose()?;
        let server = ServerConfig {
            host: env("HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.or(fc.server.port).unwrap_or(DEFAULT_PORT),
        };

        tracing::debug!(
            agent = %name,
            speak = voice.speak,
            listen = voice.listen,
            languages = ?languages,
            "configuration resolved"
        );

        Ok(Self {
            voice,
            assistant: AssistantConfig {
                name,
                languages,
                wake_words,
                confirmation_phrases,
            },
            server,
        })
    }

    /// The primary wake word, as reported in status responses
    #[must_use]
    pub fn wake_word(&self) -> &str {
        self.assistant
            .wake_words
            .last()
            .map_or(self.assistant.name.as_str(), String::as_str)
    }
}

fn default_confirmation_phrases() -> Vec<String> {
    DEFAULT_CONFIRMATION_PHRASES
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Split a comma or whitespace separated list
fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn env_flag<E>(env: &E, key: &str) -> Result<Option<bool>>
where
    E: Fn(&str) -> Option<String>,
{
    let Some(raw) = env(key) else {
        return Ok(None);
    };

    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(Error::Config(format!("invalid boolean for {key}: {raw:?}"))),
    }
}
