//! Cloud text-to-speech backend
//!
//! Synthesizes MP3 audio through `OpenAI` or `ElevenLabs` and plays it on the
//! default output device. This is the primary backend; it only constructs
//! when an API key is configured and audio playback is compiled in.

use std::collections::BTreeSet;
use std::time::Duration;

use super::{
    AudioPlayback, SpeechBackend, SpeechBackendState, SpeechOutcome, Transcript, VoiceProfile,
};
use crate::config::VoiceConfig;
use crate::{Error, Result};

/// Voices offered by the `OpenAI` speech endpoint
const OPENAI_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// Upper bound on a single synthesis request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

impl TtsProvider {
    /// Parse a provider name from configuration
    ///
    /// # Errors
    ///
    /// Returns error for unknown provider names
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "elevenlabs" | "eleven_labs" => Ok(Self::ElevenLabs),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }

    /// Canonical provider name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::ElevenLabs => "elevenlabs",
        }
    }
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::blocking::Client,
    api_key: String,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a new TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_openai(api_key: String, voice: String, speed: f32, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: build_client()?,
            api_key,
            voice,
            speed,
            model,
            provider: TtsProvider::OpenAI,
        })
    }

    /// Create a new TTS instance using `ElevenLabs`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_elevenlabs(api_key: String, voice_id: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: build_client()?,
            api_key,
            voice: voice_id,
            speed: 1.0, // ElevenLabs doesn't use speed in the same way
            model,
            provider: TtsProvider::ElevenLabs,
        })
    }

    /// Build from voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or its API key is missing
    pub fn from_config(config: &VoiceConfig) -> Result<Self> {
        let provider = TtsProvider::parse(&config.tts_provider)?;
        match provider {
            TtsProvider::OpenAI => Self::new_openai(
                config.openai_api_key.clone().unwrap_or_default(),
                config.tts_voice.clone(),
                config.tts_speed,
                config.tts_model.clone(),
            ),
            TtsProvider::ElevenLabs => Self::new_elevenlabs(
                config.elevenlabs_api_key.clone().unwrap_or_default(),
                config.tts_voice.clone(),
                config.tts_model.clone(),
            ),
        }
    }

    /// Provider in use
    #[must_use]
    pub const fn provider(&self) -> TtsProvider {
        self.provider
    }

    /// Voices this provider can be asked for
    #[must_use]
    pub fn voices(&self) -> Vec<String> {
        match self.provider {
            TtsProvider::OpenAI => OPENAI_VOICES.iter().map(ToString::to_string).collect(),
            TtsProvider::ElevenLabs => vec![self.voice.clone()],
        }
    }

    /// Synthesize text to MP3 bytes with the configured voice
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.synthesize_with_voice(text, &self.voice)
    }

    /// Synthesize text to MP3 bytes with a specific voice
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub fn synthesize_with_voice(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        match self.provider {
            TtsProvider::OpenAI => self.synthesize_openai(text, voice),
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text, voice),
        }
    }

    /// Synthesize using `OpenAI` TTS
    fn synthesize_openai(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        Ok(response.bytes()?.to_vec())
    }

    /// Synthesize using `ElevenLabs` TTS
    fn synthesize_elevenlabs(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("https://api.elevenlabs.io/v1/text-to-speech/{voice}");

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        Ok(response.bytes()?.to_vec())
    }
}

fn build_client() -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Cloud synthesis with local playback
pub struct CloudSpeech {
    tts: TextToSpeech,
    playback: AudioPlayback,
    voices: Vec<VoiceProfile>,
    transcript: Transcript,
}

impl CloudSpeech {
    /// Combine a TTS client with an output device
    #[must_use]
    pub fn new(tts: TextToSpeech, playback: AudioPlayback, transcript: Transcript) -> Self {
        let voices = tts
            .voices()
            .into_iter()
            .enumerate()
            .map(|(index, id)| VoiceProfile {
                index,
                display_name: id.clone(),
                id,
                language_tags: BTreeSet::new(),
            })
            .collect();

        Self {
            tts,
            playback,
            voices,
            transcript,
        }
    }

    /// Build from voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if TTS is not configured or no output device can be opened
    pub fn from_config(config: &VoiceConfig, transcript: Transcript) -> Result<Self> {
        let tts = TextToSpeech::from_config(config)?;
        let playback = AudioPlayback::new()?;
        tracing::debug!(provider = tts.provider().as_str(), "cloud speech constructed");
        Ok(Self::new(tts, playback, transcript))
    }

    fn play(&mut self, text: &str, voice: Option<&str>) -> Result<()> {
        let audio = match voice {
            Some(voice) => self.tts.synthesize_with_voice(text, voice)?,
            None => self.tts.synthesize(text)?,
        };
        self.playback.play_mp3(&audio)
    }
}

impl SpeechBackend for CloudSpeech {
    fn name(&self) -> &str {
        self.tts.provider().as_str()
    }

    fn state(&self) -> SpeechBackendState {
        SpeechBackendState::Ready
    }

    fn speak(&mut self, text: &str, voice_index: Option<usize>) -> SpeechOutcome {
        let voice = voice_index
            .and_then(|i| self.voices.get(i))
            .map(|v| v.id.clone());

        match self.play(text, voice.as_deref()) {
            Ok(()) => SpeechOutcome::Played,
            Err(e) => {
                tracing::warn!(backend = self.name(), error = %e, "cloud speech failed");
                self.transcript.echo(text);
                SpeechOutcome::DegradedToText
            }
        }
    }

    fn list_voices(&self) -> Vec<VoiceProfile> {
        self.voices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        assert_eq!(TtsProvider::parse("openai").unwrap(), TtsProvider::OpenAI);
        assert_eq!(TtsProvider::parse(" ElevenLabs ").unwrap(), TtsProvider::ElevenLabs);
        assert!(TtsProvider::parse("kokoro").is_err());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = TextToSpeech::new_openai(
            String::new(),
            "alloy".to_string(),
            1.0,
            "tts-1".to_string(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config(_)));

        let err = TextToSpeech::new_elevenlabs(
            String::new(),
            "voice".to_string(),
            "eleven_monolingual_v1".to_string(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
