//! Request orchestration.
//!
//! Sequences one verification request through
//! `Received -> Classified -> Acquired -> Aligned -> Compared -> Calibrated`,
//! with `Failed` reachable from any stage. Whatever happens, every transient
//! file created along the way is released before the result is returned: the
//! [`ResourceReaper`] travels with the request and its `Drop` impl covers the
//! paths no explicit release reaches (early returns, panics in the blocking
//! section, task join failures).
//!
//! The two per-image pipelines run sequentially; alignment and comparison are
//! CPU-bound and execute on the blocking thread pool so the async runtime is
//! not starved.

pub mod error;


pub use error::{ImageField, PipelineError, StageError};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::acquire::ImageAcquirer;
use crate::align::FaceAligner;
use crate::calibrate::{ConfidenceScore, calibrate};
use crate::engine::SimilarityEngine;
use crate::reaper::ResourceReaper;
use crate::reference::ImageReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    Classified,
    Acquired,
    Aligned,
    Compared,
    Calibrated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Received => "received",
            Stage::Classified => "classified",
            Stage::Acquired => "acquired",
            Stage::Aligned => "aligned",
            Stage::Compared => "compared",
            Stage::Calibrated => "calibrated",
        })
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "pipeline stage");
}

/// The verification pipeline, constructed once per process and shared across
/// requests. Collaborators are immutable; there is no cross-request state.
pub struct RequestPipeline {
    acquirer: ImageAcquirer,
    aligner: Arc<FaceAligner>,
    engine: Arc<dyn SimilarityEngine>,
    threshold_percent: f64,
}

impl RequestPipeline {
    pub fn new(
        acquirer: ImageAcquirer,
        aligner: FaceAligner,
        engine: Arc<dyn SimilarityEngine>,
        threshold_percent: f64,
    ) -> Self {
        Self {
            acquirer,
            aligner: Arc::new(aligner),
            engine,
            threshold_percent,
        }
    }

    /// The threshold every verdict in this process is taken against.
    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Runs one verification request to completion.
    ///
    /// A request always runs fully once started: either a clean traversal to
    /// a calibrated score, or a normalized [`PipelineError`]. Transient files
    /// never outlive the call.
    #[instrument(skip(self))]
    pub async fn verify(
        &self,
        image1: &str,
        image2: &str,
    ) -> Result<ConfidenceScore, PipelineError> {
        match self.run(image1, image2).await {
            Ok(score) => Ok(score),
            Err(e) => {
                warn!(error = %e, "verification pipeline failed");
                Err(e)
            }
        }
    }

    async fn run(&self, image1: &str, image2: &str) -> Result<ConfidenceScore, PipelineError> {
        let mut reaper = ResourceReaper::new();
        enter(Stage::Received);

        let reference1 = ImageReference::classify(image1)
            .map_err(|e| PipelineError::stage(ImageField::Image1, e))?;
        let reference2 = ImageReference::classify(image2)
            .map_err(|e| PipelineError::stage(ImageField::Image2, e))?;
        enter(Stage::Classified);

        let acquired1 = self
            .acquirer
            .acquire(&reference1)
            .await
            .map_err(|e| PipelineError::stage(ImageField::Image1, e))?;
        reaper.track(&acquired1.local_path);

        let acquired2 = self
            .acquirer
            .acquire(&reference2)
            .await
            .map_err(|e| PipelineError::stage(ImageField::Image2, e))?;
        reaper.track(&acquired2.local_path);
        enter(Stage::Acquired);

        let aligner = Arc::clone(&self.aligner);
        let engine = Arc::clone(&self.engine);
        let threshold = self.threshold_percent;
        let path1 = acquired1.local_path.clone();
        let path2 = acquired2.local_path.clone();

        // The reaper rides along so crop files created inside are tracked,
        // and so a panic in the blocking section still releases everything.
        let (mut reaper, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = blocking_stages(&aligner, &*engine, threshold, &path1, &path2, &mut reaper);
            (reaper, outcome)
        })
        .await
        .map_err(|e| {
            PipelineError::Compare(crate::engine::EngineError::Comparison {
                reason: format!("comparison task failed: {e}"),
            })
        })?;

        reaper.release_all();
        outcome
    }
}

/// Alignment, comparison, and calibration, off the async runtime.
fn blocking_stages(
    aligner: &FaceAligner,
    engine: &dyn SimilarityEngine,
    threshold_percent: f64,
    path1: &Path,
    path2: &Path,
    reaper: &mut ResourceReaper,
) -> Result<ConfidenceScore, PipelineError> {
    let aligned1 = aligner
        .align(path1)
        .map_err(|e| PipelineError::stage(ImageField::Image1, e))?;
    if !aligned1.fallback_used {
        reaper.track(&aligned1.local_path);
    }

    let aligned2 = aligner
        .align(path2)
        .map_err(|e| PipelineError::stage(ImageField::Image2, e))?;
    if !aligned2.fallback_used {
        reaper.track(&aligned2.local_path);
    }
    enter(Stage::Aligned);

    let comparison = engine.compare(&aligned1.local_path, &aligned2.local_path)?;
    enter(Stage::Compared);

    let score = calibrate(f64::from(comparison.distance), threshold_percent);
    enter(Stage::Calibrated);
    debug!(
        distance = comparison.distance,
        confidence = score.confidence_percent,
        verdict = score.verdict,
        "request calibrated"
    );

    Ok(score)
}
