//! Error types for the core collaborators.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by the process and filesystem collaborators.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A shell command could not be spawned at all.
    #[error("failed to spawn '{command}': {message}")]
    Spawn {
        /// The full command line that failed to start.
        command: String,
        /// The underlying OS error message.
        message: String,
    },

    /// A filesystem operation failed.
    #[error("io error at {}: {message}", path.display())]
    Io {
        /// The path the operation targeted.
        path: PathBuf,
        /// The underlying OS error message.
        message: String,
    },
}

impl CoreError {
    /// Creates a spawn error from an OS error.
    #[must_use]
    pub fn spawn(command: impl Into<String>, source: &std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            message: source.to_string(),
        }
    }

    /// Creates an io error tagged with the path it happened at.
    #[must_use]
    pub fn io(path: &Path, source: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
