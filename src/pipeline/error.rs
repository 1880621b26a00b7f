//! Pipeline error taxonomy.
//!
//! Every failure a request can hit is one of these; the gateway normalizes
//! them into the structured 400 payload and nothing else ever reaches the
//! caller. Detector misses are deliberately absent: they degrade, they do
//! not fail.

use std::fmt;

use thiserror::Error;

use crate::acquire::AcquireError;
use crate::align::AlignError;
use crate::engine::EngineError;
use crate::reference::FormatError;

/// Which request field a per-image stage failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Image1,
    Image2,
}

impl fmt::Display for ImageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageField::Image1 => "image1",
            ImageField::Image2 => "image2",
        })
    }
}

/// A failure in one of the per-image stages (classify, acquire, align).
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Align(#[from] AlignError),
}

/// A normalized request failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Per-image stage failure, scoped to the field that caused it.
    #[error("{field}: {source}")]
    Stage {
        field: ImageField,
        #[source]
        source: StageError,
    },

    /// Similarity-engine failure; the reason is the collaborator's own text.
    #[error(transparent)]
    Compare(#[from] EngineError),
}

impl PipelineError {
    pub fn stage(field: ImageField, source: impl Into<StageError>) -> Self {
        Self::Stage {
            field,
            source: source.into(),
        }
    }
}
