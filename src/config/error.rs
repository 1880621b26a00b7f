//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::model::UnknownModel;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Embedding-model selector is not one of the supported names.
    #[error(transparent)]
    InvalidModel(#[from] UnknownModel),

    /// Threshold string could not be parsed as a number.
    #[error("failed to parse match threshold '{value}': {source}")]
    ThresholdParseError {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Threshold is outside the 0-100 percent range.
    #[error("invalid match threshold '{value}': must be between 0 and 100")]
    InvalidThreshold { value: String },

    /// File-size cap could not be parsed or is zero.
    #[error("invalid max file size '{value}': must be a positive number of megabytes")]
    InvalidFileSize { value: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },
}
