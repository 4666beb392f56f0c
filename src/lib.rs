//! Voice front end for AI assistants
//!
//! Turns free-form spoken or typed text into:
//! - a normalized command for an agent router (wake word stripped,
//!   confirmation phrases detected)
//! - sanitized, speakable text sent to a speech backend that degrades to a
//!   printed transcript when no audio is possible
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              HTTP API  /  CLI                         │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ utterance
//! ┌──────────────────────────▼───────────────────────────┐
//! │   Normalizer  →  Responder (keyword lookup / router)  │
//! └──────────────────────────┬───────────────────────────┘
//!                            │ response text
//! ┌──────────────────────────▼───────────────────────────┐
//! │   Speech worker → Speech facade → sanitize            │
//! │        cloud TTS  │  native voice  │  transcript      │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod error;
pub mod speech;

pub use command::{
    IntentResponse, KeywordResponder, NormalizedCommand, Responder, Utterance,
    VoiceCommandNormalizer, normalize, respond,
};
pub use config::Config;
pub use error::{Error, Result};
pub use speech::{Speech, SpeechBackendState, SpeechOutcome, SpeechWorker, Transcript, sanitize};
