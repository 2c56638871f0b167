// src/api/http/chat.rs

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::chat::ChatOutcome;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub config_url: ConfigRef,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ConfigRef {
    pub configuration: String,
    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,
}

#[derive(Deserialize)]
pub struct FormatRequest {
    pub raw_data: Value,
    pub org_msg: String,
}

#[derive(Serialize)]
pub struct FormatResponse {
    pub response: String,
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// One chat turn. Always 200: pipeline failures surface as a
/// conversational response, never as an HTTP error.
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatOutcome> {
    info!("received chat message: {}", request.message);

    let outcome = app_state
        .chat_service
        .handle_message(
            &request.message,
            &request.config_url.configuration,
            request.config_url.user_email.as_deref(),
        )
        .await;

    Json(outcome)
}

/// Restate a backend payload as a human-readable sentence.
pub async fn format_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<FormatRequest>,
) -> Json<FormatResponse> {
    let response = app_state
        .chat_service
        .format_payload(&request.raw_data, &request.org_msg)
        .await;

    Json(FormatResponse { response })
}
