//! Single-worker speech queue
//!
//! The speech facade blocks while audio plays and cannot speak two texts at
//! once. The worker owns one [`Speech`] on a dedicated OS thread and speaks
//! queued texts in the order they arrive, so request handlers can hand text
//! off and respond immediately.

use std::thread::JoinHandle;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::{Speech, SpeechBackendState, SpeechOutcome, VoiceProfile};
use crate::{Error, Result};

/// Snapshot of the facade taken when the worker started
#[derive(Debug, Clone, Serialize)]
pub struct SpeechStatus {
    pub backend: String,
    pub state: SpeechBackendState,
    pub using_fallback: bool,
    pub voices: Vec<VoiceProfile>,
}

impl SpeechStatus {
    fn of(speech: &Speech) -> Self {
        Self {
            backend: speech.backend_name().to_string(),
            state: speech.state(),
            using_fallback: speech.using_fallback(),
            voices: speech.list_voices(),
        }
    }

    /// Whether the active backend can produce audio
    #[must_use]
    pub fn audio_available(&self) -> bool {
        self.state == SpeechBackendState::Ready
    }
}

struct SpeechJob {
    text: String,
    voice_index: Option<usize>,
    done: Option<oneshot::Sender<SpeechOutcome>>,
}

/// Handle to the speech thread
///
/// Dropping the handle closes the queue; texts already queued are still
/// spoken before the thread exits.
pub struct SpeechWorker {
    jobs: Option<mpsc::UnboundedSender<SpeechJob>>,
    status: SpeechStatus,
    thread: Option<JoinHandle<()>>,
}

impl SpeechWorker {
    /// Start the worker, building the facade on its thread
    ///
    /// The facade is built there so blocking HTTP clients and audio devices
    /// are created and dropped outside the async runtime.
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned or dies during setup
    pub async fn start<F>(build: F) -> Result<Self>
    where
        F: FnOnce() -> Speech + Send + 'static,
    {
        let (jobs_tx, mut jobs_rx) = mpsc::unbounded_channel::<SpeechJob>();
        let (status_tx, status_rx) = oneshot::channel();

        let thread = std::thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || {
                let mut speech = build();
                if status_tx.send(SpeechStatus::of(&speech)).is_err() {
                    return;
                }

                while let Some(job) = jobs_rx.blocking_recv() {
                    let outcome = speech.speak_with_voice(&job.text, job.voice_index);
                    tracing::debug!(?outcome, chars = job.text.len(), "speech job finished");
                    if let Some(done) = job.done {
                        let _ = done.send(outcome);
                    }
                }

                tracing::debug!("speech queue closed");
            })?;

        let status = status_rx
            .await
            .map_err(|_| Error::Synthesis("speech thread exited during setup".to_string()))?;

        tracing::info!(
            backend = %status.backend,
            state = ?status.state,
            using_fallback = status.using_fallback,
            "speech worker started"
        );

        Ok(Self {
            jobs: Some(jobs_tx),
            status,
            thread: Some(thread),
        })
    }

    /// Queue text without waiting for it to be spoken
    ///
    /// Returns false if the worker is no longer running.
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        self.send(SpeechJob {
            text: text.into(),
            voice_index: None,
            done: None,
        })
    }

    /// Queue text and wait until it has been spoken
    ///
    /// Earlier queued texts are spoken first. If the worker has stopped the
    /// text is reported as degraded.
    pub async fn speak(&self, text: impl Into<String>, voice_index: Option<usize>) -> SpeechOutcome {
        let (done_tx, done_rx) = oneshot::channel();
        let queued = self.send(SpeechJob {
            text: text.into(),
            voice_index,
            done: Some(done_tx),
        });

        if !queued {
            return SpeechOutcome::DegradedToText;
        }

        done_rx.await.unwrap_or(SpeechOutcome::DegradedToText)
    }

    /// Facade snapshot from startup
    #[must_use]
    pub const fn status(&self) -> &SpeechStatus {
        &self.status
    }

    fn send(&self, job: SpeechJob) -> bool {
        let Some(jobs) = &self.jobs else {
            return false;
        };

        if jobs.send(job).is_err() {
            tracing::warn!("speech worker stopped, dropping text");
            return false;
        }
        true
    }
}

impl Drop for SpeechWorker {
    fn drop(&mut self) {
        // Closing the channel ends the loop once the queue drains
        self.jobs.take();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("speech thread panicked");
        }
    }
}

impl std::fmt::Debug for SpeechWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechWorker")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
