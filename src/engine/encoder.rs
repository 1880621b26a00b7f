//! ONNX-backed embedding engine (supports stub mode).

use std::path::Path;

use image::ImageReader;
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::{Comparison, EmbeddingModel, EngineError, SimilarityEngine};

const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 127.5;

/// Stub embeddings are a normalized grayscale thumbnail of this edge length.
const STUB_THUMBNAIL_SIZE: u32 = 16;

enum EncoderBackend {
    Onnx { session: Mutex<Session> },
    Stub,
}

/// Embedding/distance engine over a process-wide ONNX session.
///
/// With no model file configured the engine runs in stub mode: embeddings are
/// derived from a downsampled grayscale thumbnail, so identical images still
/// compare at distance zero. Stub mode is for tests and model-less
/// deployments, not for production accuracy.
pub struct EmbeddingEngine {
    backend: EncoderBackend,
    model: EmbeddingModel,
}

impl std::fmt::Debug for EmbeddingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingEngine")
            .field(
                "backend",
                &match self.backend {
                    EncoderBackend::Onnx { .. } => "Onnx",
                    EncoderBackend::Stub => "Stub",
                },
            )
            .field("model", &self.model)
            .finish()
    }
}

impl EmbeddingEngine {
    /// Loads the engine, falling back to stub mode when no model file is
    /// configured.
    pub fn load(model: EmbeddingModel, model_path: Option<&Path>) -> Result<Self, EngineError> {
        let Some(path) = model_path else {
            warn!(%model, "no embedding model configured, similarity engine running in STUB mode");
            return Ok(Self::stub(model));
        };

        if !path.exists() {
            return Err(EngineError::ModelLoad {
                reason: format!("model file not found: {}", path.display()),
            });
        }

        let session = Session::builder()
            .and_then(|builder| builder.with_intra_threads(2))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| EngineError::ModelLoad {
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), %model, "loaded embedding model");

        Ok(Self {
            backend: EncoderBackend::Onnx {
                session: Mutex::new(session),
            },
            model,
        })
    }

    /// Stub-mode engine (no model file).
    pub fn stub(model: EmbeddingModel) -> Self {
        Self {
            backend: EncoderBackend::Stub,
            model,
        }
    }

    pub fn model(&self) -> EmbeddingModel {
        self.model
    }

    fn embed(&self, path: &Path) -> Result<Vec<f32>, EngineError> {
        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| EngineError::Comparison {
                reason: format!("could not read {}: {e}", path.display()),
            })?
            .decode()
            .map_err(|e| EngineError::Comparison {
                reason: format!("could not decode {}: {e}", path.display()),
            })?;

        let raw = match &self.backend {
            EncoderBackend::Onnx { session } => {
                let (width, height) = self.model.input_size();
                let input = preprocess(&image, width, height);

                let mut session = session.lock();
                let outputs = session
                    .run(ort::inputs![
                        TensorRef::from_array_view(input.view()).map_err(|e| {
                            EngineError::Comparison {
                                reason: e.to_string(),
                            }
                        })?
                    ])
                    .map_err(|e| EngineError::Comparison {
                        reason: e.to_string(),
                    })?;

                let (_, values) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
                    EngineError::Comparison {
                        reason: format!("embedding extraction: {e}"),
                    }
                })?;
                values.to_vec()
            }
            EncoderBackend::Stub => stub_embedding(&image),
        };

        Ok(l2_normalize(raw))
    }
}

impl SimilarityEngine for EmbeddingEngine {
    fn compare(&self, left: &Path, right: &Path) -> Result<Comparison, EngineError> {
        let a = self.embed(left)?;
        let b = self.embed(right)?;

        if a.len() != b.len() {
            return Err(EngineError::Comparison {
                reason: format!("embedding dimensions differ: {} vs {}", a.len(), b.len()),
            });
        }

        let distance = cosine_distance(&a, &b);
        debug!(distance, "compared face embeddings");
        Ok(Comparison { distance })
    }
}

/// Resizes to the model input and normalizes into an NCHW tensor.
fn preprocess(image: &image::DynamicImage, width: u32, height: u32) -> Array4<f32> {
    let resized = image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] =
                (pixel[channel] as f32 - PIXEL_MEAN) / PIXEL_STD;
        }
    }
    tensor
}

/// Deterministic model-free embedding: a grayscale thumbnail, flattened.
fn stub_embedding(image: &image::DynamicImage) -> Vec<f32> {
    image
        .resize_exact(STUB_THUMBNAIL_SIZE, STUB_THUMBNAIL_SIZE, FilterType::Triangle)
        .to_luma8()
        .pixels()
        .map(|p| p[0] as f32)
        .collect()
}

fn l2_normalize(values: Vec<f32>) -> Vec<f32> {
    let norm: f32 = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        values.into_iter().map(|v| v / norm).collect()
    } else {
        values
    }
}

/// Cosine distance over L2-normalized embeddings, floored at zero.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (1.0 - dot).max(0.0)
}
