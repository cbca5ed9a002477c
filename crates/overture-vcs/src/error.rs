//! Error types for git source acquisition.

use std::path::PathBuf;

use thiserror::Error;

/// One failed attempt against a candidate clone URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlAttempt {
    /// The candidate URL, before any protocol rewriting.
    pub url: String,
    /// Git's diagnostics for the failure.
    pub error: String,
}

fn render_attempts(attempts: &[UrlAttempt]) -> String {
    let mut rendered = String::new();
    for attempt in attempts {
        rendered.push_str("\n  ");
        rendered.push_str(&attempt.url);
        rendered.push_str(": ");
        rendered.push_str(attempt.error.trim());
    }
    rendered
}

/// Errors raised while acquiring or syncing a git working copy.
#[derive(Error, Debug)]
pub enum VcsError {
    /// The package descriptor names no reference to check out.
    #[error("package '{package}' is missing reference information")]
    MissingSourceReference {
        /// The offending package name.
        package: String,
    },

    /// The package descriptor lists no candidate source URLs.
    #[error("package '{package}' has no source urls")]
    MissingSourceUrl {
        /// The offending package name.
        package: String,
    },

    /// The working copy carries uncommitted modifications.
    #[error("source directory {} has uncommitted changes:\n{details}", path.display())]
    LocalChanges {
        /// The dirty working copy.
        path: PathBuf,
        /// `git status --porcelain` output describing the modifications.
        details: String,
    },

    /// An update targeted a directory that is not a git checkout.
    #[error("{} does not contain a git repository; expected a .git directory", path.display())]
    NotRepository {
        /// The non-repository path.
        path: PathBuf,
    },

    /// The git binary disappeared from PATH mid-operation (or was never there).
    #[error("git was not found in PATH; install git and make sure it is available")]
    GitNotFound,

    /// A required git command exited non-zero.
    #[error("'{command}' failed: {stderr}")]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// No checkout strategy produced the requested reference.
    #[error("failed to check out reference '{reference}': {stderr}")]
    CheckoutFailed {
        /// The reference that could not be checked out.
        reference: String,
        /// Captured standard error from the last attempt.
        stderr: String,
    },

    /// Every candidate URL was attempted and all of them failed.
    #[error("failed to clone from any of the candidate urls:{}", render_attempts(.attempts))]
    AllUrlsFailed {
        /// The failed attempts, in the order they were made.
        attempts: Vec<UrlAttempt>,
    },

    /// A working copy could not be fully deleted.
    #[error("could not completely delete {}", path.display())]
    RemoveFailed {
        /// The path that survived removal.
        path: PathBuf,
    },

    /// A collaborator failure (process spawn, filesystem).
    #[error(transparent)]
    Core(#[from] overture_core::CoreError),
}

impl VcsError {
    /// Creates a [`VcsError::CommandFailed`] from a command and its stderr.
    #[must_use]
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}

/// Result type alias for VCS operations.
pub type Result<T> = std::result::Result<T, VcsError>;
