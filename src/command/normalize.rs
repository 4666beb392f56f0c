//! Wake word stripping and confirmation detection
//!
//! Wake words frame an utterance, so they are only matched as a prefix.
//! Confirmation phrases are conversational closers and may appear anywhere.
//! All matching ignores case; returned text is always sliced from the
//! original so casing survives.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Confirmation phrases used when none are configured
pub const DEFAULT_CONFIRMATION_PHRASES: &[&str] = &[
    "do it", "go ahead", "execute", "proceed", "do that", "go on", "please",
];

/// Punctuation trimmed between a wake word and the command
const SEPARATORS: &[char] = &[',', '.', '!', '?', ':', ';', '-'];

/// Raw text from the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    /// Language the text was recognized in, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Utterance {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl From<&str> for Utterance {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// An utterance ready for routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedCommand {
    /// Trimmed utterance with any wake word prefix removed
    pub stripped_text: String,
    pub wake_word_matched: bool,
    pub confirmation_detected: bool,
    /// First configured phrase found in `stripped_text`
    pub matched_confirmation_phrase: Option<String>,
}

impl NormalizedCommand {
    /// `stripped_text` with the first occurrence of the matched phrase removed
    ///
    /// Returns the text unchanged if no confirmation was detected.
    #[must_use]
    pub fn without_confirmation(&self) -> String {
        let Some(phrase) = &self.matched_confirmation_phrase else {
            return self.stripped_text.clone();
        };

        match find_ignore_case(&self.stripped_text, phrase) {
            Some((start, end)) => {
                let before = self.stripped_text[..start].trim_end_matches(is_separator);
                let after = self.stripped_text[end..].trim_start_matches(is_separator);
                match (before.is_empty(), after.is_empty()) {
                    (true, _) => after.to_string(),
                    (_, true) => before.to_string(),
                    _ => format!("{before} {after}"),
                }
            }
            None => self.stripped_text.clone(),
        }
    }
}

/// Normalize an utterance
///
/// Wake words are tried in order as prefixes of the trimmed text and only
/// the first match is removed. Confirmation phrases are then searched in
/// order within what remains; the phrase is reported but not removed.
/// Blank wake words and phrases never match.
#[must_use]
pub fn normalize<W, C>(
    utterance: &str,
    wake_words: &[W],
    confirmation_phrases: &[C],
) -> NormalizedCommand
where
    W: AsRef<str>,
    C: AsRef<str>,
{
    let trimmed = utterance.trim();

    let stripped = wake_words
        .iter()
        .map(AsRef::as_ref)
        .filter(|w| !w.trim().is_empty())
        .find_map(|w| strip_prefix_ignore_case(trimmed, w.trim()));

    let (stripped_text, wake_word_matched) = match stripped {
        Some(rest) => (rest.trim_start_matches(is_separator).trim_end(), true),
        None => (trimmed, false),
    };

    let matched_confirmation_phrase = confirmation_phrases
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.trim().is_empty())
        .find(|p| find_ignore_case(stripped_text, p).is_some())
        .map(ToString::to_string);

    NormalizedCommand {
        stripped_text: stripped_text.to_string(),
        wake_word_matched,
        confirmation_detected: matched_confirmation_phrase.is_some(),
        matched_confirmation_phrase,
    }
}

/// Default wake words for an agent name, longest framing first
#[must_use]
pub fn wake_words_for(agent_name: &str) -> Vec<String> {
    let name = agent_name.trim();
    vec![format!("hey {name}"), format!("ok {name}"), name.to_string()]
}

/// Normalizer bound to a configured vocabulary
#[derive(Debug, Clone)]
pub struct VoiceCommandNormalizer {
    wake_words: Vec<String>,
    confirmation_phrases: Vec<String>,
}

impl VoiceCommandNormalizer {
    /// Create a normalizer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `wake_words` is empty or has a blank entry
    pub fn new(wake_words: Vec<String>, confirmation_phrases: Vec<String>) -> Result<Self> {
        if wake_words.is_empty() {
            return Err(Error::Config("at least one wake word is required".to_string()));
        }
        if wake_words.iter().any(|w| w.trim().is_empty()) {
            return Err(Error::Config("wake words must not be blank".to_string()));
        }

        tracing::debug!(
            wake_words = ?wake_words,
            confirmation_phrases = confirmation_phrases.len(),
            "command normalizer initialized"
        );

        Ok(Self {
            wake_words,
            confirmation_phrases,
        })
    }

    /// Normalizer for an agent name with the default confirmation phrases
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the name is blank
    pub fn for_agent(agent_name: &str) -> Result<Self> {
        if agent_name.trim().is_empty() {
            return Err(Error::Config("agent name must not be blank".to_string()));
        }
        Self::new(
            wake_words_for(agent_name),
            DEFAULT_CONFIRMATION_PHRASES
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn normalize(&self, utterance: &Utterance) -> NormalizedCommand {
        let command = normalize(&utterance.text, &self.wake_words, &self.confirmation_phrases);
        tracing::trace!(
            wake_word_matched = command.wake_word_matched,
            confirmation = ?command.matched_confirmation_phrase,
            language = ?utterance.language,
            "utterance normalized"
        );
        command
    }

    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }

    #[must_use]
    pub fn confirmation_phrases(&self) -> &[String] {
        &self.confirmation_phrases
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

/// Strip `prefix` from `text` ignoring case, returning the remainder of `text`
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = text.char_indices();
    let mut end = 0;

    for wanted in prefix.chars() {
        let (i, got) = rest.next()?;
        if !chars_eq_ignore_case(got, wanted) {
            return None;
        }
        end = i + got.len_utf8();
    }

    Some(&text[end..])
}

/// Byte range of the first case-insensitive occurrence of `needle`
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    haystack.char_indices().find_map(|(start, _)| {
        strip_prefix_ignore_case(&haystack[start..], needle)
            .map(|rest| (start, haystack.len() - rest.len()))
    })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_word_and_confirmation() {
        let command = normalize("Jarvis, search the web, do it", &["jarvis"], &["do it"]);

        assert_eq!(command.stripped_text, "search the web, do it");
        assert!(command.wake_word_matched);
        assert!(command.confirmation_detected);
        assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("do it"));
    }

    #[test]
    fn test_no_wake_word() {
        let command = normalize("search the web", &["jarvis"], &["do it"]);

        assert_eq!(command.stripped_text, "search the web");
        assert!(!command.wake_word_matched);
        assert!(!command.confirmation_detected);
        assert_eq!(command.matched_confirmation_phrase, None);
    }

    #[test]
    fn test_first_wake_word_wins() {
        let words = wake_words_for("Jarvis");
        let command = normalize("  HEY jarvis: open the pod bay doors ", &words, &[] as &[&str]);
        assert_eq!(command.stripped_text, "open the pod bay doors");

        // Only one prefix is stripped
        let command = normalize("jarvis jarvis stop", &["jarvis"], &[] as &[&str]);
        assert_eq!(command.stripped_text, "jarvis stop");
    }

    #[test]
    fn test_wake_word_must_be_prefix() {
        let command = normalize("tell jarvis hello", &["jarvis"], &[] as &[&str]);
        assert!(!command.wake_word_matched);
        assert_eq!(command.stripped_text, "tell jarvis hello");
    }

    #[test]
    fn test_confirmation_order() {
        let command = normalize("go ahead and do it", &["jarvis"], &["do it", "go ahead"]);
        assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("do it"));

        let command = normalize("go ahead and do it", &["jarvis"], &["go ahead", "do it"]);
        assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("go ahead"));
    }

    #[test]
    fn test_confirmation_searched_after_strip() {
        // The wake word itself is not scanned for phrases
        let command = normalize("please search", &["please"], &["please"]);
        assert!(command.wake_word_matched);
        assert!(!command.confirmation_detected);
    }

    #[test]
    fn test_blank_entries_never_match() {
        let command = normalize("hello", &["", "  "], &[""]);
        assert!(!command.wake_word_matched);
        assert!(!command.confirmation_detected);
        assert_eq!(command.stripped_text, "hello");
    }

    #[test]
    fn test_empty_utterance() {
        let command = normalize("", &["jarvis"], &["do it"]);
        assert_eq!(command.stripped_text, "");
        assert!(!command.wake_word_matched);
        assert!(!command.confirmation_detected);
    }

    #[test]
    fn test_unicode_case_folding() {
        let command = normalize("ÉLODIE, allume la lumière", &["élodie"], &["LUMIÈRE"]);
        assert!(command.wake_word_matched);
        assert_eq!(command.stripped_text, "allume la lumière");
        assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("LUMIÈRE"));
    }

    #[test]
    fn test_without_confirmation() {
        let command = normalize("Jarvis, search the web, Do It", &["jarvis"], &["do it"]);
        assert_eq!(command.stripped_text, "search the web, Do It");
        assert_eq!(command.without_confirmation(), "search the web");

        let command = normalize("go ahead, delete the file", &["jarvis"], &["go ahead"]);
        assert_eq!(command.without_confirmation(), "delete the file");

        let command = normalize("search the web", &["jarvis"], &["do it"]);
        assert_eq!(command.without_confirmation(), "search the web");
    }

    #[test]
    fn test_normalizer_rejects_bad_wake_words() {
        assert!(VoiceCommandNormalizer::new(Vec::new(), Vec::new()).is_err());
        assert!(VoiceCommandNormalizer::new(vec![" ".to_string()], Vec::new()).is_err());
        assert!(VoiceCommandNormalizer::for_agent("").is_err());
    }

    #[test]
    fn test_normalizer_for_agent() {
        let normalizer = VoiceCommandNormalizer::for_agent("Friday").unwrap();
        assert_eq!(normalizer.wake_words(), ["hey Friday", "ok Friday", "Friday"]);

        let command = normalizer.normalize(&Utterance::new("ok friday go ahead").with_language("en"));
        assert!(command.wake_word_matched);
        assert_eq!(command.stripped_text, "go ahead");
        assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("go ahead"));
    }
}
