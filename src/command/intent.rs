//! Keyword intent lookup
//!
//! A stand-in for a real agent router: the first table keyword found in the
//! utterance picks a canned answer, anything else echoes the utterance back
//! through a default template.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Placeholder substituted with the utterance in default templates
const PLACEHOLDER: &str = "{}";

/// Default answer when no keyword matches
pub const DEFAULT_TEMPLATE: &str = "I understand you said: '{}'. I'm a voice assistant ready to help! \
     Try asking me to search for something or ask me questions.";

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResponse {
    pub keyword: String,
    /// Returned verbatim on match
    pub template: String,
}

impl IntentResponse {
    #[must_use]
    pub fn new(keyword: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            template: template.into(),
        }
    }
}

/// The stock keyword table, in match order
#[must_use]
pub fn default_intents() -> Vec<IntentResponse> {
    [
        (
            "hello",
            "Hello! I'm your voice assistant. How can I help you?",
        ),
        ("jarvis", "Yes, I'm here! What would you like me to do?"),
        (
            "search",
            "I'm ready to help you search for information. What would you like to find?",
        ),
        (
            "weather",
            "I can help you check the weather. Which location would you like to know about?",
        ),
        (
            "time",
            "I can tell you the current time. What timezone are you interested in?",
        ),
        (
            "help",
            "I'm your voice-enabled assistant. You can ask me to search for information, \
             answer questions, or help with various tasks.",
        ),
    ]
    .into_iter()
    .map(|(keyword, template)| IntentResponse::new(keyword, template))
    .collect()
}

/// Answer an utterance from a keyword table
///
/// Keywords match as case-insensitive substrings, in table order. When none
/// match, `default_template` is returned with its first `{}` replaced by the
/// utterance as given.
#[must_use]
pub fn respond(utterance: &str, table: &[IntentResponse], default_template: &str) -> String {
    let lowered = utterance.to_lowercase();

    table
        .iter()
        .filter(|entry| !entry.keyword.is_empty())
        .find(|entry| lowered.contains(&entry.keyword.to_lowercase()))
        .map_or_else(
            || default_template.replacen(PLACEHOLDER, utterance, 1),
            |entry| entry.template.clone(),
        )
}

/// Something that answers normalized commands
///
/// Implemented by the keyword lookup; an agent router can take its place
/// without callers changing.
pub trait Responder: Send + Sync {
    /// Short name reported as the agent that answered
    fn name(&self) -> &str;

    /// Answer an utterance
    fn respond(&self, utterance: &str) -> String;
}

/// [`Responder`] backed by a keyword table
#[derive(Debug, Clone)]
pub struct KeywordResponder {
    table: Vec<IntentResponse>,
    default_template: String,
}

impl KeywordResponder {
    /// Create a responder
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `default_template` has no `{}` placeholder
    pub fn new(table: Vec<IntentResponse>, default_template: impl Into<String>) -> Result<Self> {
        let default_template = default_template.into();
        if !default_template.contains(PLACEHOLDER) {
            return Err(Error::Config(
                "default response template needs a {} placeholder".to_string(),
            ));
        }

        Ok(Self {
            table,
            default_template,
        })
    }

    #[must_use]
    pub fn table(&self) -> &[IntentResponse] {
        &self.table
    }
}

impl Default for KeywordResponder {
    fn default() -> Self {
        Self {
            table: default_intents(),
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Responder for KeywordResponder {
    fn name(&self) -> &'static str {
        "voice_assistant"
    }

    fn respond(&self, utterance: &str) -> String {
        respond(utterance, &self.table, &self.default_template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting_table() -> Vec<IntentResponse> {
        vec![IntentResponse::new("hello", "Hello! ...")]
    }

    #[test]
    fn test_keyword_match() {
        assert_eq!(
            respond("Hello there", &greeting_table(), "I heard: {}"),
            "Hello! ..."
        );
    }

    #[test]
    fn test_default_keeps_original_case() {
        assert_eq!(
            respond("xyz123", &greeting_table(), "I heard: {}"),
            "I heard: xyz123"
        );
        assert_eq!(
            respond("Open The DOOR", &greeting_table(), "I heard: {}"),
            "I heard: Open The DOOR"
        );
    }

    #[test]
    fn test_first_match_in_table_order() {
        let table = default_intents();
        // "search" precedes "weather" in the table
        let answer = respond("search the weather", &table, DEFAULT_TEMPLATE);
        assert!(answer.contains("search for information"));

        // Substring match, not whole word
        let answer = respond("what time is it", &table, DEFAULT_TEMPLATE);
        assert!(answer.contains("current time"));
    }

    #[test]
    fn test_template_is_verbatim() {
        let table = vec![IntentResponse::new("ping", "pong {}")];
        assert_eq!(respond("PING", &table, "{}"), "pong {}");
    }

    #[test]
    fn test_braces_in_utterance_not_reexpanded() {
        assert_eq!(respond("say {}", &[], "I heard: {}"), "I heard: say {}");
    }

    #[test]
    fn test_empty_utterance() {
        assert_eq!(respond("", &greeting_table(), "I heard: {}"), "I heard: ");
    }

    #[test]
    fn test_responder_rejects_template_without_placeholder() {
        let err = KeywordResponder::new(default_intents(), "I heard you").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_responder() {
        let responder = KeywordResponder::default();
        assert_eq!(responder.name(), "voice_assistant");
        assert_eq!(responder.table().len(), 6);
        assert!(responder.respond("xyz").starts_with("I understand you said: 'xyz'."));
    }
}
