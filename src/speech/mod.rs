//! Speech output
//!
//! Text goes through [`sanitize`] and then to one of two backends: a cloud
//! TTS backend with local playback, or the native OS voice through
//! [`EngineAdapter`]. [`Speech`] picks one at construction and never
//! switches. When audio cannot be produced the text is echoed to a
//! [`Transcript`] instead, so callers never fail because of speech.

mod adapter;
mod cloud;
mod engine;
mod playback;
mod sanitize;
mod worker;

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

pub use adapter::{DEFAULT_RATE_WPM, DEFAULT_VOLUME, EngineAdapter};
pub use cloud::{CloudSpeech, TextToSpeech, TtsProvider};
pub use engine::{CommandEngine, EngineVoice, SynthesisEngine};
pub use playback::AudioPlayback;
pub use sanitize::{ELLIPSIS, MAX_SPOKEN_CHARS, sanitize};
pub use worker::{SpeechStatus, SpeechWorker};

use crate::Result;
use crate::config::VoiceConfig;

/// Lifecycle of a synthesis backend
///
/// Moves forward only: `Uninitialized` becomes one of the other three once
/// and stays there for the life of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechBackendState {
    /// Not yet initialized
    Uninitialized,
    /// Can synthesize audio
    Ready,
    /// Engine present but setup failed; speech is echoed as text
    Degraded,
    /// Engine absent; speech is echoed as text
    Unavailable,
}

/// What happened to one `speak` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechOutcome {
    /// Audio was produced
    Played,
    /// Audio failed or was unavailable; the text was echoed instead
    DegradedToText,
}

/// A synthesis voice exposed by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceProfile {
    /// Position in the backend's voice list
    pub index: usize,
    /// Engine-specific identifier
    pub id: String,
    pub display_name: String,
    pub language_tags: BTreeSet<String>,
}

impl VoiceProfile {
    /// Whether any tag matches a language such as "en" or "en-us"
    #[must_use]
    pub fn supports_language(&self, language: &str) -> bool {
        let wanted = language.to_lowercase();
        self.language_tags.iter().any(|tag| {
            tag == &wanted
                || tag.starts_with(&format!("{wanted}-"))
                || wanted.starts_with(&format!("{tag}-"))
        })
    }
}

/// A synthesis backend behind the [`Speech`] facade
///
/// `speak` may block until playback finishes and must not fail: problems
/// degrade the call to a transcript echo.
pub trait SpeechBackend: Send {
    /// Short backend name for status and logs
    fn name(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> SpeechBackendState;

    /// Speak text, optionally with a one-off voice from [`Self::list_voices`]
    fn speak(&mut self, text: &str, voice_index: Option<usize>) -> SpeechOutcome;

    /// Voices this backend can use; empty unless ready
    fn list_voices(&self) -> Vec<VoiceProfile>;
}

/// Where text goes when it cannot be spoken
///
/// Clones share the same sink.
#[derive(Clone)]
pub struct Transcript {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Transcript {
    /// Echo to standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Echo to an arbitrary writer
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write one transcript line for text that was not spoken
    pub fn echo(&self, text: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(sink, "[TTS Fallback]: {text}").and_then(|()| sink.flush()) {
            tracing::warn!(error = %e, "failed to write speech transcript");
        }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}

/// Speech facade
///
/// Chooses between a primary backend and the native [`EngineAdapter`] once,
/// at construction. All text is sanitized before reaching either backend.
/// `speak` takes `&mut self`: calls on one instance must be serialized.
pub struct Speech {
    backend: Box<dyn SpeechBackend>,
    using_fallback: bool,
}

impl Speech {
    /// Try `primary`, falling back to the adapter built by `fallback`
    ///
    /// The fallback closure only runs when the primary fails to construct.
    #[must_use]
    pub fn select<P, F>(primary: P, fallback: F) -> Self
    where
        P: FnOnce() -> Result<Box<dyn SpeechBackend>>,
        F: FnOnce() -> EngineAdapter,
    {
        match primary() {
            Ok(backend) => {
                tracing::info!(backend = backend.name(), "using primary speech backend");
                Self {
                    backend,
                    using_fallback: false,
                }
            }
            Err(e) => {
                let adapter = fallback();
                tracing::warn!(
                    error = %e,
                    fallback = adapter.name(),
                    state = ?adapter.state(),
                    "primary speech backend unavailable, using fallback"
                );
                Self {
                    backend: Box::new(adapter),
                    using_fallback: true,
                }
            }
        }
    }

    /// Build from configuration: cloud TTS first, native voice second
    #[must_use]
    pub fn from_config(config: &VoiceConfig, transcript: &Transcript) -> Self {
        let language = config.language.clone();
        let voice_index = config.voice_index;

        Self::select(
            || {
                CloudSpeech::from_config(config, transcript.clone())
                    .map(|cloud| Box::new(cloud) as Box<dyn SpeechBackend>)
            },
            || {
                let mut adapter = EngineAdapter::native(transcript.clone());
                adapter.initialize(&language, voice_index);
                adapter
            },
        )
    }

    /// Sanitize and speak text through the active backend
    pub fn speak(&mut self, text: &str) -> SpeechOutcome {
        self.speak_with_voice(text, None)
    }

    /// Like [`Self::speak`] with a one-off voice override
    pub fn speak_with_voice(&mut self, text: &str, voice_index: Option<usize>) -> SpeechOutcome {
        let clean = sanitize(text);
        if clean.is_empty() {
            tracing::debug!("nothing speakable after sanitizing");
            return SpeechOutcome::Played;
        }
        self.backend.speak(&clean, voice_index)
    }

    /// Voices of the active backend
    #[must_use]
    pub fn list_voices(&self) -> Vec<VoiceProfile> {
        self.backend.list_voices()
    }

    /// Whether the fallback adapter was selected
    #[must_use]
    pub const fn using_fallback(&self) -> bool {
        self.using_fallback
    }

    /// Name of the active backend
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// State of the active backend
    #[must_use]
    pub fn state(&self) -> SpeechBackendState {
        self.backend.state()
    }
}

impl std::fmt::Debug for Speech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speech")
            .field("backend", &self.backend.name())
            .field("using_fallback", &self.using_fallback)
            .finish()
    }
}
