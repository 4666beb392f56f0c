//! Error types for the voice front end

use thiserror::Error;

/// Result type alias for voice front end operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice front end
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A synthesis dependency (engine binary, audio device, feature) is absent
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Synthesis engine failed while speaking
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
