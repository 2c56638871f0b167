// src/api/http/router.rs
// HTTP router composition for REST API endpoints

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::chat::{chat_handler, format_handler, health_handler};
use crate::state::AppState;

/// Main HTTP router: health probe plus the two chat endpoints.
pub fn http_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_handler))

        // Chat pipeline
        .route("/chat", post(chat_handler))

        // Backend payload formatting
        .route("/format", post(format_handler))

        .with_state(app_state)
}
