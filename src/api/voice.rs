//! Voice command endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::command::Utterance;
use crate::speech::{SpeechStatus, VoiceProfile};

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/voice/process", post(process))
        .route("/voice/status", get(status))
        .route("/voice/voices", get(voices))
        .route("/api/voice", post(echo))
        .with_state(state)
}

/// Text query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub message: String,
    /// Requested agent; reported back as `agent_used`
    #[serde(default)]
    pub agent_type: Option<String>,
    /// Recognition language of `message`
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub agent_used: String,
    pub processed: bool,
    pub timestamp: String,
}

/// Answer a text query
async fn query(
    State(state): State<Arc<ApiState>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, VoiceError> {
    let Json(request) = request?;

    let response = state.responder.respond(request.message.trim());
    state.speak(&response);

    Ok(Json(QueryResponse {
        response,
        agent_used: request
            .agent_type
            .unwrap_or_else(|| state.responder.name().to_string()),
        processed: true,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub original_message: String,
    pub processed_message: String,
    pub wake_word_matched: bool,
    pub confirmation_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_phrase: Option<String>,
    pub response: String,
    /// Whether the response was queued for speech
    pub voice_ready: bool,
    pub timestamp: String,
}

/// Normalize a voice command and answer it
async fn process(
    State(state): State<Arc<ApiState>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, VoiceError> {
    let Json(request) = request?;

    let utterance = Utterance {
        text: request.message,
        language: request.language,
    };
    let command = state.normalizer.normalize(&utterance);
    let response = state.responder.respond(&command.stripped_text);
    let voice_ready = state.speak(&response);

    tracing::debug!(
        wake_word_matched = command.wake_word_matched,
        confirmation = ?command.matched_confirmation_phrase,
        voice_ready,
        "voice command processed"
    );

    Ok(Json(ProcessResponse {
        original_message: utterance.text,
        processed_message: command.stripped_text,
        wake_word_matched: command.wake_word_matched,
        confirmation_detected: command.confirmation_detected,
        confirmation_phrase: command.matched_confirmation_phrase,
        response,
        voice_ready,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Echo request; a missing message is treated as empty
#[derive(Debug, Deserialize)]
pub struct EchoRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub response: String,
    pub echo: String,
    pub processed: bool,
}

/// Acknowledge a voice message without routing it
async fn echo(
    request: Result<Json<EchoRequest>, JsonRejection>,
) -> Result<Json<EchoResponse>, VoiceError> {
    let Json(request) = request?;

    Ok(Json(EchoResponse {
        response: format!("Voice command received: {}", request.message),
        echo: request.message,
        processed: true,
    }))
}

#[derive(Debug, Serialize)]
pub struct VoiceStatusResponse {
    pub voice_enabled: bool,
    pub listen_enabled: bool,
    pub tts_available: bool,
    pub tts_backend: Option<String>,
    pub using_fallback: bool,
    pub wake_word: String,
    pub languages: Vec<String>,
    pub status: &'static str,
}

/// Report speech and listening configuration
async fn status(State(state): State<Arc<ApiState>>) -> Json<VoiceStatusResponse> {
    let speech = state.speech.as_ref().map(|worker| worker.status());
    let tts_available = speech.is_some_and(SpeechStatus::audio_available);

    let status = match speech {
        None => "disabled",
        Some(_) if tts_available => "ready",
        Some(_) => "text_only",
    };

    Json(VoiceStatusResponse {
        voice_enabled: speech.is_some(),
        listen_enabled: state.listen_enabled,
        tts_available,
        tts_backend: speech.map(|s| s.backend.clone()),
        using_fallback: speech.is_some_and(|s| s.using_fallback),
        wake_word: state.wake_word.clone(),
        languages: state.languages.clone(),
        status,
    })
}

/// Voices of the active speech backend
async fn voices(State(state): State<Arc<ApiState>>) -> Json<Vec<VoiceProfile>> {
    Json(
        state
            .speech
            .as_ref()
            .map(|worker| worker.status().voices.clone())
            .unwrap_or_default(),
    )
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceError {
    MalformedRequest(String),
}

impl From<JsonRejection> for VoiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            response: String,
            processed: bool,
            error: String,
        }

        match self {
            Self::MalformedRequest(detail) => {
                tracing::debug!(%detail, "rejected malformed request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        response: "Sorry, I couldn't read that request. Send JSON like {\"message\": \"...\"}."
                            .to_string(),
                        processed: false,
                        error: detail,
                    }),
                )
                    .into_response()
            }
        }
    }
}
