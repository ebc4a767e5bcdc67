//! Admin routes. Every handler here requires the admin role.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Utc};

use crate::identity::Caller;
use crate::routes::error_response;
use crate::state::AppState;
use kennisbank_llm::{EmbedderBackend, GeneratorBackend};

pub fn routes<E, G>() -> Router<Arc<AppState<E, G>>>
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    Router::new().route("/admin/dashboard", get(dashboard))
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "error": "Admin access required" })),
    )
        .into_response()
}

// ---------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------

async fn dashboard<E, G>(State(state): State<Arc<AppState<E, G>>>, caller: Caller) -> Response
where
    E: EmbedderBackend + 'static,
    G: GeneratorBackend + 'static,
{
    if !caller.0.role.is_admin() {
        return forbidden();
    }

    let now = Utc::now();
    let month_start = now
        .date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or(now);

    match state.store.dashboard_stats(month_start) {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}
