// src/main.rs

use std::sync::Arc;

use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yuba_backend::api::http::http_router;
use yuba_backend::chat::ChatOptions;
use yuba_backend::config::CONFIG;
use yuba_backend::llm::{GeminiClient, TextGenerator};
use yuba_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // CONFIG loads .env on first touch; read it before installing tracing
    // so the fallback log level applies.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(CONFIG.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Yuba backend");
    info!("Model: {}", CONFIG.genai_model);
    info!("Retrieval strategy: {}", CONFIG.retrieval_strategy);

    let options = ChatOptions::from_config();
    let genai_http = reqwest::Client::new();
    let llm: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_env(genai_http)?);
    let app_state = Arc::new(AppState::new(llm, options));

    // Mirror the request origin so the widget works from any tenant site.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let app = http_router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
