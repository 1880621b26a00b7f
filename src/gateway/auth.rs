//! API-key middleware for the compare route.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::payload::{AuthErrorBody, INVALID_API_KEY};
use super::state::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose `X-API-Key` header does not match the configured
/// secret. When no secret is configured, every request is rejected.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let authorized = match (state.api_key.as_deref(), presented) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };

    if !authorized {
        tracing::warn!("rejected request with invalid or missing API key");
        return (
            StatusCode::FORBIDDEN,
            Json(AuthErrorBody {
                error: INVALID_API_KEY,
            }),
        )
            .into_response();
    }

    next.run(request).await
}
