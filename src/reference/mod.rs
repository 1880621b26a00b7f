//! Input reference classification.
//!
//! Callers supply each image as an opaque string that is either a remote URL
//! or an inline base64 data URI. [`classify`] decides which, as a pure
//! function with no network or filesystem access; the kind is always derived,
//! never caller-declared.

#[cfg(test)]
mod tests;

use thiserror::Error;

/// URL schemes accepted for remote references.
const URL_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

/// Prefix that every inline-encoded reference must start with.
const DATA_URI_PREFIX: &str = "data:image/";

/// Marker separating the data-URI media type from its payload.
const BASE64_MARKER: &str = ";base64,";

/// The reference matched neither the URL nor the data-URI shape.
#[derive(Debug, Error)]
#[error("The provided value must be either a valid URL or a Base64-encoded image")]
pub struct FormatError;

/// How a raw reference should be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Remote image, fetched over HTTP(S)/FTP.
    Url,
    /// Inline `data:image/<subtype>;base64,<payload>` image.
    InlineEncoded,
}

/// A caller-supplied image reference with its derived kind.
#[derive(Debug, Clone)]
pub struct ImageReference {
    raw: String,
    kind: ReferenceKind,
}

impl ImageReference {
    /// Classifies `raw` and wraps it. Fails if the string has neither shape.
    pub fn classify(raw: &str) -> Result<Self, FormatError> {
        Ok(Self {
            raw: raw.to_string(),
            kind: classify(raw)?,
        })
    }

    /// The original caller string, echoed verbatim in every response.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }
}

/// Determines whether `raw` is a URL or an inline-encoded image.
pub fn classify(raw: &str) -> Result<ReferenceKind, FormatError> {
    if is_url(raw) {
        Ok(ReferenceKind::Url)
    } else if inline_payload(raw).is_some() {
        Ok(ReferenceKind::InlineEncoded)
    } else {
        Err(FormatError)
    }
}

/// Splits an inline-encoded reference into its base64 payload.
///
/// Returns `None` unless the string is `data:image/<subtype>;base64,<payload>`
/// with a non-empty alphanumeric subtype and a non-empty payload.
pub fn inline_payload(raw: &str) -> Option<&str> {
    let rest = strip_prefix_ignore_case(raw, DATA_URI_PREFIX)?;
    let marker = rest.find(BASE64_MARKER)?;
    let subtype = &rest[..marker];
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return None;
    }
    let payload = &rest[marker + BASE64_MARKER.len()..];
    if payload.is_empty() || payload.chars().any(|c| c.is_whitespace()) {
        return None;
    }
    Some(payload)
}

fn is_url(raw: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| {
        strip_prefix_ignore_case(raw, scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.chars().any(|c| c.is_whitespace()))
    })
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if value.len() >= prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}
