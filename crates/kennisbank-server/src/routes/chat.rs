//! Chat routes: readiness, ask, history, and feedback.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::identity::Caller;
use crate::routes::error_response;
use crate::state::AppState;
use kennisbank_llm::{EmbedderBackend, GeneratorBackend, EMBEDDING_MODEL};
use kennisbank_retrieval::{AskRequest, DEFAULT_HISTORY_LIMIT};
use kennisbank_store::FeedbackValue;

pub fn routes<E, G>() -> Router<Arc<AppState<E, G>>>
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    Router::new()
        .route("/chat/status", get(get_status))
        .route("/chat/ask", post(ask))
        .route("/chat/history", get(get_history).delete(clear_history))
        .route("/chat/history/{id}/feedback", post(submit_feedback))
}

// ---------------------------------------------------------------
// Status
// ---------------------------------------------------------------

async fn get_status<E, G>(State(state): State<Arc<AppState<E, G>>>) -> Json<serde_json::Value>
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    let resolved = state.llm_config.resolve_provider();

    Json(serde_json::json!({
        "llm_available": resolved.is_some(),
        "llm_provider": state.llm_config.active_provider_name(),
        "llm_model": resolved.map(|(_, model, _)| model),
        "embedding_model": EMBEDDING_MODEL,
        "embedding_dimension": state.engine.embedding_dimension(),
        "documents": state.store.count_documents().unwrap_or(0),
        "embedded_chunks": state.store.count_chunk_embeddings().unwrap_or(0),
    }))
}

// ---------------------------------------------------------------
// Ask
// ---------------------------------------------------------------

async fn ask<E, G>(
    State(state): State<Arc<AppState<E, G>>>,
    caller: Caller,
    Json(request): Json<AskRequest>,
) -> Response
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    if request.question.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Question must not be empty" })),
        )
            .into_response();
    }

    match state.engine.ask(&caller.0, request).await {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

// ---------------------------------------------------------------
// History & feedback
// ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

async fn get_history<E, G>(
    State(state): State<Arc<AppState<E, G>>>,
    caller: Caller,
    Query(params): Query<HistoryParams>,
) -> Response
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    match state.engine.history(&caller.0.id, limit) {
        Ok(records) => Json(records).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct FeedbackBody {
    feedback: i32,
}

async fn submit_feedback<E, G>(
    State(state): State<Arc<AppState<E, G>>>,
    caller: Caller,
    Path(record_id): Path<String>,
    Json(body): Json<FeedbackBody>,
) -> Response
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    let Some(value) = FeedbackValue::from_i32(body.feedback) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Feedback must be 1 or -1" })),
        )
            .into_response();
    };

    match state.engine.submit_feedback(&caller.0.id, &record_id, value) {
        Ok(()) => Json(serde_json::json!({ "message": "Feedback saved" })).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

async fn clear_history<E, G>(
    State(state): State<Arc<AppState<E, G>>>,
    caller: Caller,
) -> Response
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    match state.engine.clear_history(&caller.0.id) {
        Ok(removed) => Json(serde_json::json!({
            "message": "Chat history cleared",
            "removed": removed,
        }))
        .into_response(),
        Err(err) => error_response(err).into_response(),
    }
}
