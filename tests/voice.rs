//! Command normalization, intent lookup and sanitizer integration tests

use voice_front::command::{DEFAULT_TEMPLATE, default_intents, wake_words_for};
use voice_front::speech::{ELLIPSIS, MAX_SPOKEN_CHARS};
use voice_front::{
    IntentResponse, KeywordResponder, Responder, Utterance, VoiceCommandNormalizer, normalize,
    respond, sanitize,
};

#[test]
fn test_normalize_wake_word_and_confirmation() {
    let command = normalize("Jarvis, search the web, do it", &["jarvis"], &["do it"]);

    assert_eq!(command.stripped_text, "search the web, do it");
    assert!(command.wake_word_matched);
    assert!(command.confirmation_detected);
    assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("do it"));
}

#[test]
fn test_normalize_without_wake_word() {
    let command = normalize("search the web", &["jarvis"], &["do it"]);

    assert!(!command.wake_word_matched);
    assert!(!command.confirmation_detected);
    assert_eq!(command.stripped_text, "search the web");
}

#[test]
fn test_normalize_preserves_casing() {
    let command = normalize("HEY JARVIS Turn On The Lights", &wake_words_for("jarvis"), &["please"]);

    assert!(command.wake_word_matched);
    assert_eq!(command.stripped_text, "Turn On The Lights");
}

#[test]
fn test_stripped_text_never_starts_with_wake_word() {
    let words = wake_words_for("Jarvis");
    for utterance in [
        "jarvis what time is it",
        "Hey Jarvis, what time is it",
        "ok JARVIS - what time is it",
    ] {
        let command = normalize(utterance, &words, &[] as &[&str]);
        assert!(command.wake_word_matched, "{utterance}");
        assert_eq!(command.stripped_text, "what time is it", "{utterance}");
    }
}

#[test]
fn test_normalizer_round_trip_through_responder() {
    let normalizer = VoiceCommandNormalizer::for_agent("Jarvis").unwrap();
    let responder = KeywordResponder::default();

    let command = normalizer.normalize(&Utterance::new("Jarvis, what's the weather, go ahead"));
    let answer = responder.respond(&command.stripped_text);

    assert_eq!(command.matched_confirmation_phrase.as_deref(), Some("go ahead"));
    assert!(answer.contains("check the weather"));
}

#[test]
fn test_wake_word_alone_answers_with_default() {
    let normalizer = VoiceCommandNormalizer::for_agent("Jarvis").unwrap();
    let command = normalizer.normalize(&Utterance::new("Jarvis"));

    assert!(command.wake_word_matched);
    assert_eq!(command.stripped_text, "");
    assert!(KeywordResponder::default()
        .respond(&command.stripped_text)
        .starts_with("I understand you said: ''."));
}

#[test]
fn test_respond_keyword_and_default() {
    let table = vec![IntentResponse::new("hello", "Hello! ...")];

    assert_eq!(respond("Hello there", &table, "I heard: {}"), "Hello! ...");
    assert_eq!(respond("xyz123", &table, "I heard: {}"), "I heard: xyz123");
}

#[test]
fn test_default_table_order() {
    let keywords: Vec<String> = default_intents().into_iter().map(|i| i.keyword).collect();
    assert_eq!(
        keywords,
        vec!["hello", "jarvis", "search", "weather", "time", "help"]
    );

    // "hello" wins over "help" because it comes first
    let answer = respond("hello, help me", &default_intents(), DEFAULT_TEMPLATE);
    assert!(answer.starts_with("Hello!"));
}

#[test]
fn test_sanitize_plain_text_only_collapses_whitespace() {
    assert_eq!(
        sanitize("  the quick\tbrown\n\nfox  "),
        "the quick brown fox"
    );
}

#[test]
fn test_sanitize_truncates_long_text() {
    let input = "a".repeat(250);
    let output = sanitize(&input);

    assert_eq!(output.chars().count(), MAX_SPOKEN_CHARS + ELLIPSIS.len());
    assert_eq!(output.chars().count(), 203);
    assert!(output.ends_with("..."));
}

#[test]
fn test_sanitize_is_idempotent() {
    let long = "word ".repeat(80);
    let samples = [
        "",
        "plain text",
        "See https://example.com/docs and `cargo test` now",
        "**bold** and *italic* in /usr/local/bin/tool",
        "C:\\Users\\me\\file.txt was saved",
        "unterminated `backtick stays",
        "a/ b// /c",
        long.as_str(),
    ];

    for sample in samples {
        let once = sanitize(sample);
        assert_eq!(sanitize(&once), once, "{sample:?}");
    }
}
