//! HTTP route handlers.

pub mod admin;
pub mod chat;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::AppState;
use kennisbank_core::Error;
use kennisbank_llm::{EmbedderBackend, GeneratorBackend};

/// Build the main Axum router with all routes.
pub fn build_router<E, G>(state: Arc<AppState<E, G>>) -> Router
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes<E, G>() -> Router<Arc<AppState<E, G>>>
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    Router::new().merge(chat::routes()).merge(admin::routes())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "AI Kennisbank API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// Map engine errors onto HTTP statuses. Empty-retrieval outcomes never
/// get here; they are 200s carrying a canned answer.
pub(crate) fn error_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        Error::AccessDenied(_) | Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Upstream(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}
