//! HTTP gateway (Axum) for the verification service.
//!
//! This module is primarily used by the `veriface` server binary.

pub mod auth;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::compare_handler;
pub use state::AppState;

/// Builds the service router. The compare route sits behind the API-key
/// middleware; the health route is exempt.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/compare", post(compare_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
