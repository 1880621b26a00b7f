//! Alignment error types.

use thiserror::Error;

/// Errors raised while preparing a face crop.
///
/// A detector finding no face is deliberately not represented here; that is a
/// degrade signal carried by `AlignedFace::fallback_used`.
#[derive(Debug, Error)]
pub enum AlignError {
    /// The acquired bytes could not be read as an image.
    #[error("Image not found or could not be opened: {reason}")]
    Load { reason: String },
}
