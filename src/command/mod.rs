//! Voice command parsing
//!
//! Turns a raw utterance into a [`NormalizedCommand`] for routing and answers
//! it through a [`Responder`]. Everything here is pure string work.

mod intent;
mod normalize;

pub use intent::{
    DEFAULT_TEMPLATE, IntentResponse, KeywordResponder, Responder, default_intents, respond,
};
pub use normalize::{
    DEFAULT_CONFIRMATION_PHRASES, NormalizedCommand, Utterance, VoiceCommandNormalizer, normalize,
    wake_words_for,
};
