//! Caller identity from gateway-supplied headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;

use kennisbank_retrieval::Identity;
use kennisbank_store::UserRole;

/// Extracts `x-user-id` and `x-user-role`. Session validation happens at
/// the gateway; by the time a request reaches this service the headers
/// are trusted. Requests without a complete identity are rejected.
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());
        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<UserRole>().ok());

        match (user_id, role) {
            (Some(id), Some(role)) => Ok(Caller(Identity {
                id: id.to_string(),
                role,
            })),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Missing or invalid identity headers",
                })),
            )),
        }
    }
}
