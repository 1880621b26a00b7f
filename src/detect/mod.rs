//! Face detection backends.
//!
//! Detection is consumed by the aligner through [`DetectorBackend`], an
//! ordered-chain seam: the aligner tries each configured backend in turn and
//! the first one that returns at least one box wins. A backend that finds
//! nothing (or fails internally) is not an error at the pipeline level; the
//! aligner degrades to the unmodified image.

pub mod scrfd;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use scrfd::ScrfdDetector;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockDetector;

use image::DynamicImage;
use thiserror::Error;

/// Axis-aligned bounding box of a detected face, in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Internal detector failure. Consumed by the aligner as a miss, never
/// surfaced to the caller.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model file not found: {path}")]
    ModelNotFound { path: String },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// A face-detection algorithm locating bounding boxes within an image.
pub trait DetectorBackend: Send + Sync {
    /// Short backend name, used in degradation logs.
    fn name(&self) -> &'static str;

    /// Returns zero or more face boxes, best first.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, DetectorError>;
}
