//! Face alignment with graceful degradation.
//!
//! Detection runs on a downscaled copy of the image (detection cost dominates
//! the pipeline; the crop itself is always taken from the full-resolution
//! source). Backends are tried in order; the first to report a face wins and
//! its best box is cropped, optionally converted to grayscale, and persisted
//! as a new transient file. When every backend comes up empty the original
//! acquired image is reused unchanged; failing the whole request on a missed
//! detection would be overly strict, so alignment accuracy is traded for
//! robustness.

pub mod error;


pub use error::AlignError;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, warn};

use crate::detect::{DetectorBackend, FaceBox};

/// Default factor applied to the image before detection.
pub const DEFAULT_DOWNSCALE: f32 = 0.5;

/// An image prepared for comparison.
#[derive(Debug, Clone)]
pub struct AlignedFace {
    pub local_path: PathBuf,
    /// True when no backend found a face and the original image is reused.
    pub fallback_used: bool,
}

/// Runs the ordered detector chain and crops the primary face.
pub struct FaceAligner {
    backends: Vec<Arc<dyn DetectorBackend>>,
    grayscale: bool,
    downscale: f32,
}

impl FaceAligner {
    /// Aligner with the default grayscale conversion and detection downscale.
    pub fn new(backends: Vec<Arc<dyn DetectorBackend>>) -> Self {
        Self {
            backends,
            grayscale: true,
            downscale: DEFAULT_DOWNSCALE,
        }
    }

    pub fn with_options(
        backends: Vec<Arc<dyn DetectorBackend>>,
        grayscale: bool,
        downscale: f32,
    ) -> Self {
        Self {
            backends,
            grayscale,
            downscale,
        }
    }

    /// Produces the prepared image for `path`.
    ///
    /// Only an unreadable input is an error; every detection outcome,
    /// including backend failures, resolves to either a crop or the
    /// documented fallback.
    pub fn align(&self, path: &Path) -> Result<AlignedFace, AlignError> {
        let image = load_image(path)?;

        let Some(face) = self.detect_primary_face(&image) else {
            debug!(path = %path.display(), "no face detected, reusing unaligned image");
            return Ok(AlignedFace {
                local_path: path.to_path_buf(),
                fallback_used: true,
            });
        };

        match self.persist_crop(&image, &face) {
            Some(local_path) => Ok(AlignedFace {
                local_path,
                fallback_used: false,
            }),
            // Persisting the crop is best-effort; degrade rather than fail.
            None => Ok(AlignedFace {
                local_path: path.to_path_buf(),
                fallback_used: true,
            }),
        }
    }

    /// First box from the first backend that reports any face, mapped back to
    /// full-resolution coordinates.
    fn detect_primary_face(&self, image: &DynamicImage) -> Option<FaceBox> {
        let scale = self.effective_downscale();
        let detection_image = self.detection_copy(image, scale);

        for backend in &self.backends {
            match backend.detect(&detection_image) {
                Ok(boxes) if !boxes.is_empty() => {
                    debug!(backend = backend.name(), faces = boxes.len(), "face detected");
                    let face = boxes[0];
                    return Some(FaceBox {
                        x: face.x / scale,
                        y: face.y / scale,
                        width: face.width / scale,
                        height: face.height / scale,
                        confidence: face.confidence,
                    });
                }
                Ok(_) => {
                    debug!(backend = backend.name(), "no face found, trying next backend");
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "detector backend failed, trying next");
                }
            }
        }

        None
    }

    /// The factor detection actually runs at: configured values outside
    /// (0, 1) mean no scaling, so boxes must not be re-mapped either.
    fn effective_downscale(&self) -> f32 {
        if self.downscale > 0.0 && self.downscale < 1.0 {
            self.downscale
        } else {
            1.0
        }
    }

    fn detection_copy(&self, image: &DynamicImage, scale: f32) -> DynamicImage {
        if scale >= 1.0 {
            return image.clone();
        }
        let width = ((image.width() as f32 * scale) as u32).max(1);
        let height = ((image.height() as f32 * scale) as u32).max(1);
        image.resize_exact(width, height, FilterType::Triangle)
    }

    fn persist_crop(&self, image: &DynamicImage, face: &FaceBox) -> Option<PathBuf> {
        let x = face.x.max(0.0) as u32;
        let y = face.y.max(0.0) as u32;
        let width = (face.width as u32).min(image.width().saturating_sub(x));
        let height = (face.height as u32).min(image.height().saturating_sub(y));
        if width == 0 || height == 0 {
            warn!("detected face box is empty after clamping, reusing unaligned image");
            return None;
        }

        let crop = image.crop_imm(x, y, width, height);
        let crop = if self.grayscale {
            DynamicImage::ImageLuma8(crop.to_luma8())
        } else {
            crop
        };

        let temp = match tempfile::Builder::new()
            .prefix("veriface-face-")
            .suffix(".jpg")
            .tempfile()
        {
            Ok(temp) => temp,
            Err(e) => {
                warn!(error = %e, "could not create crop file, reusing unaligned image");
                return None;
            }
        };
        let path = match temp.keep() {
            Ok((_, path)) => path,
            Err(e) => {
                warn!(error = %e, "could not persist crop file, reusing unaligned image");
                return None;
            }
        };

        if let Err(e) = crop.save_with_format(&path, ImageFormat::Jpeg) {
            warn!(error = %e, "could not write crop file, reusing unaligned image");
            let _ = std::fs::remove_file(&path);
            return None;
        }

        debug!(path = %path.display(), width, height, "persisted aligned face crop");
        Some(path)
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, AlignError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| AlignError::Load {
            reason: e.to_string(),
        })?
        .decode()
        .map_err(|e| AlignError::Load {
            reason: e.to_string(),
        })
}
