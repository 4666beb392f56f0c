//! Shared test utilities

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use voice_front::speech::EngineAdapter;
use voice_front::{Error, Speech, Transcript};

/// In-memory transcript sink
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Buffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(ToString::to_string).collect()
    }
}

/// Adapter whose engine can never be acquired
pub fn missing_engine_adapter(transcript: Transcript) -> EngineAdapter {
    let mut adapter = EngineAdapter::new(
        || Err(Error::DependencyUnavailable("no engine in tests".to_string())),
        transcript,
    );
    adapter.initialize("en", None);
    adapter
}

/// Speech facade with no primary backend and no native engine
///
/// Everything spoken ends up in `buffer`.
pub fn text_only_speech(buffer: &Buffer) -> Speech {
    let transcript = Transcript::new(buffer.clone());
    Speech::select(
        || Err(Error::DependencyUnavailable("no cloud TTS in tests".to_string())),
        move || missing_engine_adapter(transcript),
    )
}
