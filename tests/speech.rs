//! Speech facade and worker integration tests
//!
//! No audio hardware or voice binaries needed: backends are either missing
//! on purpose or recorded in memory.

use std::sync::{Arc, Mutex};

use voice_front::speech::{SpeechBackend, VoiceProfile};
use voice_front::{Speech, SpeechBackendState, SpeechOutcome, SpeechWorker, Transcript};

mod common;
use common::{Buffer, missing_engine_adapter, text_only_speech};

/// Primary backend that records what it was asked to say
struct RecordingBackend {
    spoken: Arc<Mutex<Vec<(String, Option<usize>)>>>,
}

impl SpeechBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn state(&self) -> SpeechBackendState {
        SpeechBackendState::Ready
    }

    fn speak(&mut self, text: &str, voice_index: Option<usize>) -> SpeechOutcome {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice_index));
        SpeechOutcome::Played
    }

    fn list_voices(&self) -> Vec<VoiceProfile> {
        Vec::new()
    }
}

fn recording_speech() -> (Speech, Arc<Mutex<Vec<(String, Option<usize>)>>>) {
    let spoken = Arc::new(Mutex::new(Vec::new()));
    let backend = RecordingBackend {
        spoken: Arc::clone(&spoken),
    };
    let speech = Speech::select(
        move || Ok(Box::new(backend) as Box<dyn SpeechBackend>),
        || unreachable!("fallback must not be built when the primary works"),
    );
    (speech, spoken)
}

#[test]
fn test_primary_failure_selects_fallback() {
    let buffer = Buffer::default();
    let speech = text_only_speech(&buffer);

    assert!(speech.using_fallback());
    assert_eq!(speech.backend_name(), "native");
    assert_eq!(speech.state(), SpeechBackendState::Unavailable);
    assert!(speech.list_voices().is_empty());
}

#[test]
fn test_primary_selected_when_it_constructs() {
    let (speech, _) = recording_speech();

    assert!(!speech.using_fallback());
    assert_eq!(speech.backend_name(), "recording");
    assert_eq!(speech.state(), SpeechBackendState::Ready);
}

#[test]
fn test_speak_never_fails_without_engine() {
    let buffer = Buffer::default();
    let mut speech = text_only_speech(&buffer);

    let outcome = speech.speak("Check **this** out: https://example.com/a?b=c");

    assert_eq!(outcome, SpeechOutcome::DegradedToText);
    assert_eq!(buffer.contents(), "[TTS Fallback]: Check this out:\n");
}

#[test]
fn test_sequential_speak_keeps_order() {
    let buffer = Buffer::default();
    let mut speech = text_only_speech(&buffer);

    speech.speak("first");
    speech.speak("second");

    assert_eq!(
        buffer.lines(),
        vec!["[TTS Fallback]: first", "[TTS Fallback]: second"]
    );
}

#[test]
fn test_primary_receives_sanitized_text() {
    let (mut speech, spoken) = recording_speech();

    speech.speak_with_voice("Open `src/main.rs` in\n  /home/user/notes.txt", Some(2));
    speech.speak("plain words");

    assert_eq!(
        *spoken.lock().unwrap(),
        vec![
            ("Open in notes.txt".to_string(), Some(2)),
            ("plain words".to_string(), None),
        ]
    );
}

#[test]
fn test_nothing_speakable_is_skipped() {
    let (mut speech, spoken) = recording_speech();

    assert_eq!(speech.speak("`let x = 1;`"), SpeechOutcome::Played);
    assert_eq!(speech.speak("   "), SpeechOutcome::Played);
    assert!(spoken.lock().unwrap().is_empty());
}

#[test]
fn test_fallback_is_not_retried() {
    let buffer = Buffer::default();
    let mut speech = Speech::select(
        || Err(voice_front::Error::Tts("quota exceeded".to_string())),
        {
            let transcript = Transcript::new(buffer.clone());
            move || missing_engine_adapter(transcript)
        },
    );

    for _ in 0..3 {
        speech.speak("still here");
    }

    assert!(speech.using_fallback());
    assert_eq!(buffer.lines().len(), 3);
}

#[tokio::test]
async fn test_worker_speaks_in_enqueue_order() {
    let buffer = Buffer::default();
    let speech_buffer = buffer.clone();
    let worker = SpeechWorker::start(move || text_only_speech(&speech_buffer))
        .await
        .unwrap();

    assert!(worker.enqueue("one"));
    assert!(worker.enqueue("two"));
    assert!(worker.enqueue("three"));
    let outcome = worker.speak("four", None).await;

    assert_eq!(outcome, SpeechOutcome::DegradedToText);
    assert_eq!(
        buffer.lines(),
        vec![
            "[TTS Fallback]: one",
            "[TTS Fallback]: two",
            "[TTS Fallback]: three",
            "[TTS Fallback]: four",
        ]
    );
}

#[tokio::test]
async fn test_worker_reports_status() {
    let buffer = Buffer::default();
    let speech_buffer = buffer.clone();
    let worker = SpeechWorker::start(move || text_only_speech(&speech_buffer))
        .await
        .unwrap();

    let status = worker.status();
    assert!(status.using_fallback);
    assert_eq!(status.state, SpeechBackendState::Unavailable);
    assert!(!status.audio_available());
    assert!(status.voices.is_empty());
}

#[tokio::test]
async fn test_worker_drains_queue_on_drop() {
    let buffer = Buffer::default();
    let speech_buffer = buffer.clone();
    let worker = SpeechWorker::start(move || text_only_speech(&speech_buffer))
        .await
        .unwrap();

    worker.enqueue("left in queue");
    drop(worker);

    assert_eq!(buffer.lines(), vec!["[TTS Fallback]: left in queue"]);
}
