//! Mock similarity engine for tests.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{Comparison, EngineError, SimilarityEngine};

/// Scripted engine returning a fixed distance or a fixed failure.
///
/// Records the paths of every comparison so tests can assert what the
/// pipeline fed it (and that those transient files were reaped afterwards).
pub struct MockEngine {
    outcome: Result<f32, String>,
    seen: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MockEngine {
    /// Always reports the given distance.
    pub fn with_distance(distance: f32) -> Self {
        Self {
            outcome: Ok(distance),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with the given internal reason.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Path pairs this engine has been asked to compare.
    pub fn seen(&self) -> Vec<(PathBuf, PathBuf)> {
        self.seen.lock().clone()
    }
}

impl SimilarityEngine for MockEngine {
    fn compare(&self, left: &Path, right: &Path) -> Result<Comparison, EngineError> {
        self.seen
            .lock()
            .push((left.to_path_buf(), right.to_path_buf()));
        match &self.outcome {
            Ok(distance) => Ok(Comparison {
                distance: *distance,
            }),
            Err(reason) => Err(EngineError::Comparison {
                reason: reason.clone(),
            }),
        }
    }
}
