//! Wire payloads for the compare endpoint.

use serde::{Deserialize, Serialize};

use crate::calibrate::ConfidenceScore;

/// Error body for authentication failures.
pub const INVALID_API_KEY: &str = "Invalid or missing API key";

/// Request body: two references, each a URL or a base64 data URI.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub image1: String,
    pub image2: String,
}

/// Response body shared by the 200 and 400 paths.
///
/// `image1`/`image2` always echo the caller's original raw references, never
/// local paths. A success carries a numeric `confidenceLevel` and verdict; a
/// failure carries a non-empty `reason` and nulls, never both.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResponse {
    pub status: bool,
    pub reason: Option<String>,
    #[serde(rename = "confidenceLevel")]
    pub confidence_level: Option<f64>,
    pub threshold: f64,
    #[serde(rename = "match")]
    pub matched: bool,
    pub image1: String,
    pub image2: String,
}

impl VerificationResponse {
    pub fn success(score: &ConfidenceScore, image1: String, image2: String) -> Self {
        Self {
            status: true,
            reason: Some(score.reason.to_string()),
            confidence_level: Some(score.confidence_percent),
            threshold: score.threshold,
            matched: score.verdict,
            image1,
            image2,
        }
    }

    pub fn failure(reason: String, threshold: f64, image1: String, image2: String) -> Self {
        Self {
            status: false,
            reason: Some(reason),
            confidence_level: None,
            threshold,
            matched: false,
            image1,
            image2,
        }
    }
}

/// 400 responses wrap the payload in an `error` envelope.
#[derive(Debug, Serialize)]
pub struct FailureEnvelope {
    pub error: VerificationResponse,
}

/// 403 body for missing/incorrect API keys.
#[derive(Debug, Serialize)]
pub struct AuthErrorBody {
    pub error: &'static str,
}
