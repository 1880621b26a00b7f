//! Image acquisition.
//!
//! Turns a classified [`ImageReference`] into exactly one uniquely-named
//! transient file on local disk, either by streaming a bounded-timeout HTTP
//! fetch or by decoding an inline base64 payload. Enforces the allowed
//! extension set for URLs and the configured size cap for everything.
//!
//! Ownership of the transient file passes to the caller; until then a failed
//! acquisition cleans up after itself (the temp file is unlinked on drop).

pub mod error;

#[cfg(test)]
mod tests;

pub use error::AcquireError;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use futures_util::StreamExt;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::reference::{ImageReference, ReferenceKind, inline_payload};

/// URL path extensions accepted for remote references.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Extension given to decoded inline payloads.
const DEFAULT_EXTENSION: &str = ".jpg";

const TEMP_PREFIX: &str = "veriface-";

/// A reference materialized as a transient local file.
///
/// The path is owned by the pipeline until the reaper deletes it.
#[derive(Debug)]
pub struct AcquiredImage {
    pub local_path: PathBuf,
    pub byte_size: u64,
    /// File extension the bytes were stored under (e.g. `.png`).
    pub format: String,
    /// The caller's original raw reference.
    pub origin_reference: String,
}

/// Fetches or decodes references into transient files.
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ImageAcquirer {
    /// Builds an acquirer with a bounded fetch timeout and a size cap in bytes.
    pub fn new(fetch_timeout: Duration, max_bytes: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self { client, max_bytes })
    }

    /// Materializes `reference` as a transient file, per its derived kind.
    pub async fn acquire(&self, reference: &ImageReference) -> Result<AcquiredImage, AcquireError> {
        match reference.kind() {
            ReferenceKind::Url => self.fetch_url(reference).await,
            ReferenceKind::InlineEncoded => self.decode_inline(reference),
        }
    }

    async fn fetch_url(&self, reference: &ImageReference) -> Result<AcquiredImage, AcquireError> {
        let url = reference.raw();
        let extension = url_extension(url);
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AcquireError::UnsupportedFormat { extension });
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AcquireError::Download {
                reason: e.to_string(),
            })?;

        let mut temp = transient_file(&extension).map_err(|e| AcquireError::Download {
            reason: e.to_string(),
        })?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AcquireError::Download {
                reason: e.to_string(),
            })?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                // Fail fast instead of truncating; the temp file unlinks on drop.
                return Err(AcquireError::TooLarge {
                    size: written,
                    limit: self.max_bytes,
                });
            }
            temp.as_file_mut()
                .write_all(&chunk)
                .map_err(|e| AcquireError::Download {
                    reason: e.to_string(),
                })?;
        }

        let local_path = persist(temp).map_err(|reason| AcquireError::Download { reason })?;
        debug!(path = %local_path.display(), bytes = written, "fetched remote image");

        Ok(AcquiredImage {
            local_path,
            byte_size: written,
            format: extension,
            origin_reference: url.to_string(),
        })
    }

    fn decode_inline(&self, reference: &ImageReference) -> Result<AcquiredImage, AcquireError> {
        let payload = inline_payload(reference.raw()).ok_or_else(|| AcquireError::Decode {
            reason: "malformed data URI".to_string(),
        })?;

        let bytes = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| AcquireError::Decode {
                reason: e.to_string(),
            })?;

        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(AcquireError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let mut temp = transient_file(DEFAULT_EXTENSION).map_err(|e| AcquireError::Decode {
            reason: e.to_string(),
        })?;
        temp.as_file_mut()
            .write_all(&bytes)
            .map_err(|e| AcquireError::Decode {
                reason: e.to_string(),
            })?;

        let local_path = persist(temp).map_err(|reason| AcquireError::Decode { reason })?;
        debug!(path = %local_path.display(), bytes = size, "decoded inline image");

        Ok(AcquiredImage {
            local_path,
            byte_size: size,
            format: DEFAULT_EXTENSION.to_string(),
            origin_reference: reference.raw().to_string(),
        })
    }
}

/// Creates a uniquely-named temp file that unlinks itself unless persisted.
fn transient_file(suffix: &str) -> std::io::Result<NamedTempFile> {
    Builder::new().prefix(TEMP_PREFIX).suffix(suffix).tempfile()
}

/// Detaches the temp file from auto-delete; from here the reaper owns it.
fn persist(temp: NamedTempFile) -> Result<PathBuf, String> {
    temp.keep()
        .map(|(_, path)| path)
        .map_err(|e| e.to_string())
}

/// Lowercased extension of the URL's path component, query and fragment ignored.
fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) => name[dot..].to_ascii_lowercase(),
        None => String::new(),
    }
}
