//! SCRFD face detector via ONNX Runtime.
//!
//! Anchor-free decoding over three stride levels with NMS post-processing.
//! Output tensors are taken positionally: scores for strides 8/16/32 first,
//! then the box deltas (keypoint outputs, when present, are ignored).

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use parking_lot::Mutex;
use tracing::info;

use super::{DetectorBackend, DetectorError, FaceBox};

const INPUT_SIZE: u32 = 640;
const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 128.0;
const CONFIDENCE_THRESHOLD: f32 = 0.5;
const NMS_IOU_THRESHOLD: f32 = 0.4;
const STRIDES: [u32; 3] = [8, 16, 32];
const ANCHORS_PER_CELL: usize = 2;

/// SCRFD-based detector backend.
///
/// The session is locked around `run` because ONNX Runtime inference takes
/// `&mut self`; collaborator access is serialized per process anyway.
pub struct ScrfdDetector {
    session: Mutex<Session>,
}

impl ScrfdDetector {
    /// Loads the SCRFD ONNX model from `model_path`.
    pub fn load(model_path: &Path) -> Result<Self, DetectorError> {
        if !model_path.exists() {
            return Err(DetectorError::ModelNotFound {
                path: model_path.display().to_string(),
            });
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let num_outputs = session.outputs().len();
        if num_outputs < 6 {
            return Err(DetectorError::InferenceFailed {
                reason: format!(
                    "SCRFD model requires at least 6 outputs (3 strides x score/bbox), got {num_outputs}"
                ),
            });
        }

        info!(path = %model_path.display(), outputs = num_outputs, "loaded SCRFD detector model");

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl DetectorBackend for ScrfdDetector {
    fn name(&self) -> &'static str {
        "scrfd"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, DetectorError> {
        let (input, scale) = preprocess(image);

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut detections = Vec::new();
        for (pos, &stride) in STRIDES.iter().enumerate() {
            let (_, scores) = outputs[pos].try_extract_tensor::<f32>().map_err(|e| {
                DetectorError::InferenceFailed {
                    reason: format!("scores stride {stride}: {e}"),
                }
            })?;
            let (_, deltas) = outputs[STRIDES.len() + pos]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed {
                    reason: format!("bboxes stride {stride}: {e}"),
                })?;

            decode_stride(scores, deltas, stride, scale, &mut detections);
        }

        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(non_max_suppression(detections))
    }
}

/// Resizes into the 640x640 model canvas (top-left anchored) and normalizes.
/// Returns the NCHW tensor and the applied scale for de-mapping boxes.
fn preprocess(image: &DynamicImage) -> (Array4<f32>, f32) {
    let (width, height) = (image.width().max(1), image.height().max(1));
    let scale = (INPUT_SIZE as f32 / width as f32).min(INPUT_SIZE as f32 / height as f32);
    let new_width = ((width as f32 * scale) as u32).clamp(1, INPUT_SIZE);
    let new_height = ((height as f32 * scale) as u32).clamp(1, INPUT_SIZE);

    let resized = image
        .resize_exact(new_width, new_height, FilterType::Triangle)
        .to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] =
                (pixel[channel] as f32 - PIXEL_MEAN) / PIXEL_STD;
        }
    }

    (tensor, scale)
}

/// Decodes one stride level: each cell holds `ANCHORS_PER_CELL` anchors with a
/// score and (left, top, right, bottom) distances from the cell center,
/// expressed in stride units.
fn decode_stride(scores: &[f32], deltas: &[f32], stride: u32, scale: f32, out: &mut Vec<FaceBox>) {
    let cells = (INPUT_SIZE / stride) as usize;

    for cell_y in 0..cells {
        for cell_x in 0..cells {
            for anchor in 0..ANCHORS_PER_CELL {
                let index = (cell_y * cells + cell_x) * ANCHORS_PER_CELL + anchor;
                let Some(&score) = scores.get(index) else {
                    return;
                };
                if score < CONFIDENCE_THRESHOLD {
                    continue;
                }
                let Some(d) = deltas.get(index * 4..index * 4 + 4) else {
                    return;
                };

                let center_x = (cell_x as u32 * stride) as f32;
                let center_y = (cell_y as u32 * stride) as f32;
                let stride_f = stride as f32;

                let x1 = (center_x - d[0] * stride_f) / scale;
                let y1 = (center_y - d[1] * stride_f) / scale;
                let x2 = (center_x + d[2] * stride_f) / scale;
                let y2 = (center_y + d[3] * stride_f) / scale;

                out.push(FaceBox {
                    x: x1,
                    y: y1,
                    width: (x2 - x1).max(0.0),
                    height: (y2 - y1).max(0.0),
                    confidence: score,
                });
            }
        }
    }
}

/// Greedy IoU suppression over confidence-sorted boxes.
fn non_max_suppression(sorted: Vec<FaceBox>) -> Vec<FaceBox> {
    let mut kept: Vec<FaceBox> = Vec::new();
    for candidate in sorted {
        if kept.iter().all(|k| iou(k, &candidate) <= NMS_IOU_THRESHOLD) {
            kept.push(candidate);
        }
    }
    kept
}

fn iou(a: &FaceBox, b: &FaceBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.width * a.height + b.width * b.height - intersection;
    if union > 0.0 { intersection / union } else { 0.0 }
}
