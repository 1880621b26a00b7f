//! Veriface library crate (used by the server binary and integration tests).
//!
//! Given two face-image references (URLs or base64 data URIs), the service
//! decides whether they depict the same person and reports a calibrated
//! confidence percentage. A request flows through a fixed pipeline:
//! classify -> acquire -> align -> compare -> calibrate, with every transient
//! file released before the response is written.
//!
//! # Public API Surface
//!
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`ImageReference`], [`ReferenceKind`] - Input classification
//! - [`ImageAcquirer`], [`AcquiredImage`] - Reference materialization
//! - [`FaceAligner`], [`AlignedFace`], [`DetectorBackend`] - Face preparation
//! - [`SimilarityEngine`], [`EmbeddingEngine`], [`EmbeddingModel`] - Comparison
//! - [`ConfidenceScore`], [`calibrate`] - Verdict calibration
//! - [`RequestPipeline`] - End-to-end orchestration
//! - [`gateway`] - Axum router, handlers, and payloads
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod acquire;
pub mod align;
pub mod calibrate;
pub mod config;
pub mod detect;
pub mod engine;
pub mod gateway;
pub mod pipeline;
pub mod reaper;
pub mod reference;

pub use acquire::{AcquireError, AcquiredImage, ImageAcquirer, SUPPORTED_EXTENSIONS};
pub use align::{AlignError, AlignedFace, FaceAligner};
pub use calibrate::{ConfidenceScore, MATCH_REASON, NO_MATCH_REASON, calibrate};
pub use config::{Config, ConfigError};
pub use detect::{DetectorBackend, DetectorError, FaceBox, ScrfdDetector};
pub use engine::{Comparison, EmbeddingEngine, EmbeddingModel, EngineError, SimilarityEngine};
pub use pipeline::{ImageField, PipelineError, RequestPipeline, StageError};
pub use reaper::ResourceReaper;
pub use reference::{FormatError, ImageReference, ReferenceKind};

#[cfg(any(test, feature = "mock"))]
pub use detect::MockDetector;
#[cfg(any(test, feature = "mock"))]
pub use engine::MockEngine;
