//! Similarity engine: the embedding/distance collaborator.
//!
//! The pipeline consumes this as an opaque service behind [`SimilarityEngine`]:
//! two prepared local paths in, a non-negative distance out (lower = more
//! similar). Detection enforcement is disabled at this stage; the aligner has
//! already had its chance.

pub mod encoder;
pub mod model;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use encoder::EmbeddingEngine;
pub use model::EmbeddingModel;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEngine;

use std::path::Path;

use thiserror::Error;

/// Dissimilarity between two prepared face images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Non-negative distance; 0 means identical embeddings.
    pub distance: f32,
}

/// Internal collaborator failure, surfaced to the caller as the comparison
/// failure reason. Never an unhandled fault.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Face comparison failed: {reason}")]
    Comparison { reason: String },

    /// Startup-only: the configured model file could not be loaded.
    #[error("Failed to load embedding model: {reason}")]
    ModelLoad { reason: String },
}

/// External embedding/distance collaborator contract.
pub trait SimilarityEngine: Send + Sync {
    /// Compares two local image files, returning their embedding distance.
    fn compare(&self, left: &Path, right: &Path) -> Result<Comparison, EngineError>;
}
