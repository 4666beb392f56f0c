//! Service banner and health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Service banner
#[derive(Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub status: &'static str,
    pub features: Vec<&'static str>,
    pub version: &'static str,
}

/// Liveness probe
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn banner(State(state): State<Arc<ApiState>>) -> Json<BannerResponse> {
    let mut features = vec!["voice_commands", "ai_responses"];
    if state.speech.is_some() {
        features.push("text_to_speech");
    }
    if state.listen_enabled {
        features.push("voice_recognition");
    }

    Json(BannerResponse {
        message: format!("{} voice API is running", state.agent_name),
        status: "active",
        features,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .with_state(state)
}
