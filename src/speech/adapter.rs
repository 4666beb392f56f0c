//! Native voice adapter
//!
//! Owns one [`SynthesisEngine`], the voices it reported at initialization and
//! the default rate/volume. Speech here is best-effort: a missing engine or a
//! failed call turns into a transcript line, never an error.

use super::{
    SpeechBackend, SpeechBackendState, SpeechOutcome, Transcript, VoiceProfile,
    engine::{CommandEngine, SynthesisEngine},
};
use crate::Result;

/// Default speaking rate in words per minute
pub const DEFAULT_RATE_WPM: u32 = 150;

/// Default volume, as a fraction of maximum
pub const DEFAULT_VOLUME: f32 = 0.8;

type Acquire = Box<dyn FnOnce() -> Result<Box<dyn SynthesisEngine>> + Send>;

/// Adapter around a native synthesis engine
pub struct EngineAdapter {
    acquire: Option<Acquire>,
    engine: Option<Box<dyn SynthesisEngine>>,
    engine_name: String,
    voices: Vec<VoiceProfile>,
    state: SpeechBackendState,
    transcript: Transcript,
}

impl EngineAdapter {
    /// Create an uninitialized adapter
    ///
    /// `acquire` runs once, in [`Self::initialize`].
    #[must_use]
    pub fn new<F>(acquire: F, transcript: Transcript) -> Self
    where
        F: FnOnce() -> Result<Box<dyn SynthesisEngine>> + Send + 'static,
    {
        Self {
            acquire: Some(Box::new(acquire)),
            engine: None,
            engine_name: "native".to_string(),
            voices: Vec::new(),
            state: SpeechBackendState::Uninitialized,
            transcript,
        }
    }

    /// Adapter over the OS command-line voice
    #[must_use]
    pub fn native(transcript: Transcript) -> Self {
        Self::new(
            || CommandEngine::detect().map(|engine| Box::new(engine) as Box<dyn SynthesisEngine>),
            transcript,
        )
    }

    /// Acquire the engine and apply default settings
    ///
    /// The voice at `default_voice_index` is selected when it exists,
    /// otherwise the first voice supporting `language`.
    ///
    /// Returns the resulting state. Never fails: a missing engine yields
    /// [`SpeechBackendState::Unavailable`], a failed setup
    /// [`SpeechBackendState::Degraded`]. Calling it again returns the
    /// existing state.
    pub fn initialize(
        &mut self,
        language: &str,
        default_voice_index: Option<usize>,
    ) -> SpeechBackendState {
        let Some(acquire) = self.acquire.take() else {
            return self.state;
        };

        let mut engine = match acquire() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "native voice unavailable, speech will be text only");
                self.state = SpeechBackendState::Unavailable;
                return self.state;
            }
        };
        self.engine_name = engine.name().to_string();

        match configure(engine.as_mut(), language, default_voice_index) {
            Ok(voices) => {
                tracing::info!(
                    engine = %self.engine_name,
                    voices = voices.len(),
                    language,
                    "native voice ready"
                );
                self.voices = voices;
                self.state = SpeechBackendState::Ready;
            }
            Err(e) => {
                tracing::warn!(
                    engine = %self.engine_name,
                    error = %e,
                    "native voice setup failed, speech will be text only"
                );
                self.state = SpeechBackendState::Degraded;
            }
        }

        self.engine = Some(engine);
        self.state
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SpeechBackendState {
        self.state
    }
}

/// Discover voices, pick the default one and set rate/volume
fn configure(
    engine: &mut dyn SynthesisEngine,
    language: &str,
    default_voice_index: Option<usize>,
) -> Result<Vec<VoiceProfile>> {
    let voices: Vec<VoiceProfile> = engine
        .voices()?
        .into_iter()
        .enumerate()
        .map(|(index, voice)| VoiceProfile {
            index,
            id: voice.id,
            display_name: voice.name,
            language_tags: voice.languages.into_iter().collect(),
        })
        .collect();

    let selected = default_voice_index
        .and_then(|i| voices.get(i))
        .or_else(|| voices.iter().find(|v| v.supports_language(language)));
    if let Some(voice) = selected {
        engine.set_voice(&voice.id)?;
        tracing::debug!(voice = %voice.display_name, "selected default voice");
    }

    engine.set_rate(DEFAULT_RATE_WPM)?;
    engine.set_volume(DEFAULT_VOLUME)?;

    Ok(voices)
}

impl SpeechBackend for EngineAdapter {
    fn name(&self) -> &str {
        &self.engine_name
    }

    fn state(&self) -> SpeechBackendState {
        self.state
    }

    fn speak(&mut self, text: &str, voice_index: Option<usize>) -> SpeechOutcome {
        let Some(engine) = self
            .engine
            .as_mut()
            .filter(|_| self.state == SpeechBackendState::Ready)
        else {
            self.transcript.echo(text);
            return SpeechOutcome::DegradedToText;
        };

        let voice = voice_index
            .and_then(|i| self.voices.get(i))
            .map(|v| v.id.as_str());

        match engine.say_and_wait(text, voice) {
            Ok(()) => SpeechOutcome::Played,
            Err(e) => {
                tracing::warn!(engine = %self.engine_name, error = %e, "speech synthesis failed");
                self.transcript.echo(text);
                SpeechOutcome::DegradedToText
            }
        }
    }

    fn list_voices(&self) -> Vec<VoiceProfile> {
        if self.state == SpeechBackendState::Ready {
            self.voices.clone()
        } else {
            Vec::new()
        }
    }
}
