//! HTTP API server
//!
//! Thin JSON wrappers over the command normalizer, the responder and the
//! speech worker. Handlers never wait for audio: response text is queued on
//! the worker and the HTTP response goes out immediately.

pub mod health;
pub mod voice;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::command::{Responder, VoiceCommandNormalizer};
use crate::speech::SpeechWorker;
use crate::{Config, Result};

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub agent_name: String,
    pub languages: Vec<String>,
    /// Wake word reported in status responses
    pub wake_word: String,
    pub listen_enabled: bool,
    pub normalizer: VoiceCommandNormalizer,
    pub responder: Arc<dyn Responder>,
    /// Present when responses should be spoken
    pub speech: Option<Arc<SpeechWorker>>,
}

impl ApiState {
    /// Build state from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configured wake words are unusable
    pub fn new(
        config: &Config,
        responder: Arc<dyn Responder>,
        speech: Option<Arc<SpeechWorker>>,
    ) -> Result<Self> {
        let normalizer = VoiceCommandNormalizer::new(
            config.assistant.wake_words.clone(),
            config.assistant.confirmation_phrases.clone(),
        )?;

        Ok(Self {
            agent_name: config.assistant.name.clone(),
            languages: config.assistant.languages.clone(),
            wake_word: config.wake_word().to_string(),
            listen_enabled: config.voice.listen,
            normalizer,
            responder,
            speech,
        })
    }

    /// Queue text for speech if speaking is enabled
    ///
    /// Returns whether the text was queued.
    pub fn speak(&self, text: &str) -> bool {
        self.speech
            .as_ref()
            .is_some_and(|worker| worker.enqueue(text))
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("agent_name", &self.agent_name)
            .field("responder", &self.responder.name())
            .field("speech", &self.speech)
            .finish_non_exhaustive()
    }
}

/// Build the router with all routes
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .merge(voice::router(state))
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: Arc<ApiState>, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    fn router(&self) -> Router {
        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until ctrl-c
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            crate::Error::Config(format!("failed to bind API server on {addr}: {e}"))
        })?;

        tracing::info!(
            host = %self.host,
            port = self.port,
            agent = %self.state.agent_name,
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("received shutdown signal");
                }
            })
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
