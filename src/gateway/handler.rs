//! The compare endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::payload::{CompareRequest, FailureEnvelope, VerificationResponse};
use super::state::AppState;

/// POST `/api/compare`.
///
/// Every rejection takes the same enveloped 400 shape as a pipeline failure:
/// an unparseable body, a missing or mistyped field (named in the reason,
/// with whatever the caller sent echoed back), or a stage error.
#[instrument(skip(state, body))]
pub async fn compare_handler(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let threshold = state.pipeline.threshold_percent();

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return failure_response(
                format!("Invalid JSON body: {}", rejection.body_text()),
                threshold,
                String::new(),
                String::new(),
            );
        }
    };

    let request = match serde_json::from_value::<CompareRequest>(body.clone()) {
        Ok(request) => request,
        Err(_) => {
            let image1 = string_field(&body, "image1");
            let image2 = string_field(&body, "image2");
            let missing = if image1.is_none() { "image1" } else { "image2" };
            return failure_response(
                format!("{missing} is required and must be a string"),
                threshold,
                image1.unwrap_or_default(),
                image2.unwrap_or_default(),
            );
        }
    };

    match state.pipeline.verify(&request.image1, &request.image2).await {
        Ok(score) => (
            StatusCode::OK,
            Json(VerificationResponse::success(
                &score,
                request.image1,
                request.image2,
            )),
        )
            .into_response(),
        Err(e) => failure_response(e.to_string(), threshold, request.image1, request.image2),
    }
}

fn failure_response(reason: String, threshold: f64, image1: String, image2: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(FailureEnvelope {
            error: VerificationResponse::failure(reason, threshold, image1, image2),
        }),
    )
        .into_response()
}

fn string_field(body: &serde_json::Value, key: &str) -> Option<String> {
    body.get(key).and_then(|v| v.as_str()).map(str::to_owned)
}
