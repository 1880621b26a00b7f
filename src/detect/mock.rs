//! Mock detector backends for tests.

use image::DynamicImage;
use parking_lot::Mutex;

use super::{DetectorBackend, DetectorError, FaceBox};

/// Scripted detector: returns a fixed outcome and counts invocations.
pub struct MockDetector {
    outcome: Outcome,
    calls: Mutex<usize>,
}

enum Outcome {
    Boxes(Vec<FaceBox>),
    Failing(String),
}

impl MockDetector {
    /// Always reports one face covering the given region of the detection image.
    pub fn finding(face: FaceBox) -> Self {
        Self {
            outcome: Outcome::Boxes(vec![face]),
            calls: Mutex::new(0),
        }
    }

    /// Never finds a face.
    pub fn blind() -> Self {
        Self {
            outcome: Outcome::Boxes(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    /// Fails internally on every call.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failing(reason.into()),
            calls: Mutex::new(0),
        }
    }

    /// Number of times `detect` has been invoked.
    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl DetectorBackend for MockDetector {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<FaceBox>, DetectorError> {
        *self.calls.lock() += 1;
        match &self.outcome {
            Outcome::Boxes(boxes) => Ok(boxes.clone()),
            Outcome::Failing(reason) => Err(DetectorError::InferenceFailed {
                reason: reason.clone(),
            }),
        }
    }
}
