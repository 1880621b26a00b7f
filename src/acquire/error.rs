//! Acquisition error types.

use thiserror::Error;

/// Errors raised while turning a reference into a local transient file.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// URL path extension is not one of the allowed image formats.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Transport failure, non-success status, or local write failure during fetch.
    #[error("Failed to download the image from URL: {reason}")]
    Download { reason: String },

    /// Inline payload is not well-formed base64, or the decoded bytes could not be written.
    #[error("Failed to decode Base64 image: {reason}")]
    Decode { reason: String },

    /// Acquired file exceeds the configured size cap.
    #[error("File is too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}
