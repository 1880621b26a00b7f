//! Confidence calibration.
//!
//! Pure mapping from an embedding distance to a 0-100 confidence percent and
//! a verdict against the configured threshold. Deliberately independent of
//! any model-specific threshold: the system threshold is the only one that
//! counts.


/// Success reason when the confidence clears the threshold.
pub const MATCH_REASON: &str = "Images Match";

/// Success reason when it does not.
pub const NO_MATCH_REASON: &str = "Image does not match";

/// Calibrated verdict for one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceScore {
    /// Rounded confidence, always within [0, 100].
    pub confidence_percent: f64,
    /// The threshold the verdict was taken against.
    pub threshold: f64,
    pub verdict: bool,
    pub reason: &'static str,
}

/// Maps a distance to a confidence score and verdict.
///
/// `confidence = round(clamp((1 - distance) * 100, 0, 100))`; the verdict is
/// `confidence >= threshold_percent`. Pure and side-effect-free.
pub fn calibrate(distance: f64, threshold_percent: f64) -> ConfidenceScore {
    let confidence_percent = ((1.0 - distance) * 100.0).clamp(0.0, 100.0).round();
    let verdict = confidence_percent >= threshold_percent;

    ConfidenceScore {
        confidence_percent,
        threshold: threshold_percent,
        verdict,
        reason: if verdict { MATCH_REASON } else { NO_MATCH_REASON },
    }
}
