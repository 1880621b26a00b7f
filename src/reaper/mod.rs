//! Transient-file reaping.
//!
//! Every transient file a request creates (acquired downloads, decoded
//! inline payloads, aligned crops) is tracked here and deleted exactly once
//! before the response goes out. Deletion failures are logged and swallowed;
//! cleanup must never fail a request. The `Drop` impl makes release
//! unconditional on every exit path, including panics mid-pipeline.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use tracing::debug;

/// Tracks and deletes the transient files of one request.
#[derive(Debug, Default)]
pub struct ResourceReaper {
    paths: Vec<PathBuf>,
}

impl ResourceReaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a path for deletion. Safe to call with a path twice; the
    /// second removal attempt is a no-op that gets swallowed like any other
    /// cleanup failure.
    pub fn track(&mut self, path: impl AsRef<Path>) {
        self.paths.push(path.as_ref().to_path_buf());
    }

    /// Number of paths currently tracked.
    pub fn tracked(&self) -> usize {
        self.paths.len()
    }

    /// Deletes every tracked path, best-effort, and forgets them.
    pub fn release_all(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed transient file"),
                Err(e) => debug!(path = %path.display(), error = %e, "ignoring transient file cleanup failure"),
            }
        }
    }
}

impl Drop for ResourceReaper {
    fn drop(&mut self) {
        self.release_all();
    }
}
