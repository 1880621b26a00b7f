//! Embedding model selector.

use std::fmt;
use std::str::FromStr;

/// The enumerated set of supported embedding models.
///
/// The selector determines the input resolution fed to the ONNX session; the
/// weights themselves come from the configured model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingModel {
    VggFace,
    Facenet,
    Facenet512,
    OpenFace,
    DeepFace,
    DeepId,
    ArcFace,
    Dlib,
    SFace,
    GhostFaceNet,
}

impl EmbeddingModel {
    pub const ALL: [EmbeddingModel; 10] = [
        EmbeddingModel::VggFace,
        EmbeddingModel::Facenet,
        EmbeddingModel::Facenet512,
        EmbeddingModel::OpenFace,
        EmbeddingModel::DeepFace,
        EmbeddingModel::DeepId,
        EmbeddingModel::ArcFace,
        EmbeddingModel::Dlib,
        EmbeddingModel::SFace,
        EmbeddingModel::GhostFaceNet,
    ];

    /// Canonical selector name, as accepted in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingModel::VggFace => "VGG-Face",
            EmbeddingModel::Facenet => "Facenet",
            EmbeddingModel::Facenet512 => "Facenet512",
            EmbeddingModel::OpenFace => "OpenFace",
            EmbeddingModel::DeepFace => "DeepFace",
            EmbeddingModel::DeepId => "DeepID",
            EmbeddingModel::ArcFace => "ArcFace",
            EmbeddingModel::Dlib => "Dlib",
            EmbeddingModel::SFace => "SFace",
            EmbeddingModel::GhostFaceNet => "GhostFaceNet",
        }
    }

    /// Model input resolution as (width, height).
    pub fn input_size(&self) -> (u32, u32) {
        match self {
            EmbeddingModel::VggFace => (224, 224),
            EmbeddingModel::Facenet | EmbeddingModel::Facenet512 => (160, 160),
            EmbeddingModel::OpenFace => (96, 96),
            EmbeddingModel::DeepFace => (152, 152),
            EmbeddingModel::DeepId => (47, 55),
            EmbeddingModel::ArcFace
            | EmbeddingModel::SFace
            | EmbeddingModel::GhostFaceNet => (112, 112),
            EmbeddingModel::Dlib => (150, 150),
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown model selector; carries the valid names for the error message.
#[derive(Debug, thiserror::Error)]
#[error("invalid model '{value}': must be one of {valid}", valid = valid_names())]
pub struct UnknownModel {
    pub value: String,
}

impl FromStr for EmbeddingModel {
    type Err = UnknownModel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownModel {
                value: value.to_string(),
            })
    }
}

fn valid_names() -> String {
    EmbeddingModel::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
