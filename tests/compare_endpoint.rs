//! End-to-end tests for the compare endpoint, exercising the full pipeline
//! through the public router with a mock similarity engine (and the built-in
//! stub engine where real embeddings are not needed).

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use veriface::acquire::ImageAcquirer;
use veriface::align::FaceAligner;
use veriface::engine::{EmbeddingEngine, EmbeddingModel, MockEngine, SimilarityEngine};
use veriface::gateway::{AppState, create_router};
use veriface::pipeline::RequestPipeline;

const API_KEY: &str = "integration-key";

/// 8x8 opaque PNG, small enough to inline everywhere.
const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAgAAAAICAIAAABLbSncAAAAEUlEQVR4nGOoaOrBihiGlgQAFAJhgQjU4RoAAAAASUVORK5CYII=";

fn router_with_engine(engine: Arc<dyn SimilarityEngine>) -> Router {
    let acquirer =
        ImageAcquirer::new(Duration::from_secs(2), 1024 * 1024).expect("client builds");
    let aligner = FaceAligner::new(Vec::new());
    let pipeline = RequestPipeline::new(acquirer, aligner, engine, 50.0);
    create_router(AppState::new(Arc::new(pipeline), Some(API_KEY.to_owned())))
}

fn stub_router() -> Router {
    router_with_engine(Arc::new(EmbeddingEngine::stub(EmbeddingModel::Facenet512)))
}

async fn compare(
    router: Router,
    key: Option<&str>,
    image1: &str,
    image2: &str,
) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "image1": image1, "image2": image2 });
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/compare")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn identical_inline_images_match_with_full_confidence() {
    let (status, body) =
        compare(stub_router(), Some(API_KEY), PNG_DATA_URI, PNG_DATA_URI).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["reason"], "Images Match");
    assert_eq!(body["confidenceLevel"], 100.0);
    assert_eq!(body["threshold"], 50.0);
    assert_eq!(body["match"], true);
    assert_eq!(body["image1"], PNG_DATA_URI);
    assert_eq!(body["image2"], PNG_DATA_URI);
}

#[tokio::test]
async fn distant_embeddings_do_not_match() {
    let router = router_with_engine(Arc::new(MockEngine::with_distance(0.8)));
    let (status, body) = compare(router, Some(API_KEY), PNG_DATA_URI, PNG_DATA_URI).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["reason"], "Image does not match");
    assert_eq!(body["confidenceLevel"], 20.0);
    assert_eq!(body["match"], false);
}

#[tokio::test]
async fn unsupported_url_extension_is_a_field_scoped_failure() {
    let bad_url = "https://example.com/photo.gif";
    let (status, body) = compare(stub_router(), Some(API_KEY), bad_url, PNG_DATA_URI).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = &body["error"];
    assert_eq!(error["status"], false);
    let reason = error["reason"].as_str().unwrap();
    assert!(reason.starts_with("image1:"), "got reason: {reason}");
    assert!(reason.contains("Unsupported file format: .gif"));
    assert_eq!(error["confidenceLevel"], serde_json::Value::Null);
    assert_eq!(error["match"], false);
    assert_eq!(error["threshold"], 50.0);
    assert_eq!(error["image1"], bad_url);
    assert_eq!(error["image2"], PNG_DATA_URI);
}

#[tokio::test]
async fn second_image_failures_name_the_second_field() {
    let (status, body) = compare(
        stub_router(),
        Some(API_KEY),
        PNG_DATA_URI,
        "data:image/png;base64,@@not-base64@@",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let reason = body["error"]["reason"].as_str().unwrap();
    assert!(reason.starts_with("image2:"), "got reason: {reason}");
    assert!(reason.contains("Failed to decode Base64 image"));
}

#[tokio::test]
async fn missing_api_key_is_rejected_before_the_pipeline() {
    let (status, body) = compare(stub_router(), None, PNG_DATA_URI, PNG_DATA_URI).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or missing API key");
}

#[tokio::test]
async fn wrong_api_key_is_rejected() {
    let (status, body) =
        compare(stub_router(), Some("wrong"), PNG_DATA_URI, PNG_DATA_URI).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or missing API key");
}

#[tokio::test]
async fn engine_failure_surfaces_the_collaborator_reason() {
    let router = router_with_engine(Arc::new(MockEngine::failing("embedding blew up")));
    let (status, body) = compare(router, Some(API_KEY), PNG_DATA_URI, PNG_DATA_URI).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = &body["error"];
    assert_eq!(error["status"], false);
    assert_eq!(error["reason"], "Face comparison failed: embedding blew up");
    assert_eq!(error["confidenceLevel"], serde_json::Value::Null);
    assert_eq!(error["match"], false);
}

#[tokio::test]
async fn transient_files_are_released_after_each_request() {
    let engine = Arc::new(MockEngine::with_distance(0.1));
    let router = router_with_engine(engine.clone());

    let (status, _) = compare(router, Some(API_KEY), PNG_DATA_URI, PNG_DATA_URI).await;
    assert_eq!(status, StatusCode::OK);

    let seen = engine.seen();
    assert_eq!(seen.len(), 1);
    let (left, right) = &seen[0];
    assert!(!left.exists(), "left transient file still on disk");
    assert!(!right.exists(), "right transient file still on disk");
}

#[tokio::test]
async fn health_route_needs_no_key() {
    let request = Request::builder()
        .method("GET")
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();

    let response = stub_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
