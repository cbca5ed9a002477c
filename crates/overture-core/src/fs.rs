//! Filesystem helpers used around clone and removal.

use std::path::Path;

use tracing::debug;

use crate::error::{CoreError, Result};

/// Thin wrapper over directory operations the engine performs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filesystem;

impl Filesystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Removes a directory tree. Returns whether the path is gone afterwards.
    ///
    /// A path that never existed counts as removed.
    pub fn remove_directory(&self, path: &Path) -> bool {
        if !path.exists() {
            return true;
        }
        debug!(path = %path.display(), "removing directory");
        std::fs::remove_dir_all(path).is_ok() && !path.exists()
    }

    /// Creates a directory and any missing parents.
    pub fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|err| CoreError::io(path, &err))
    }
}
