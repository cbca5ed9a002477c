//! Git source acquisition for Overture.
//!
//! This crate turns a package descriptor into a working copy on disk and
//! keeps it in sync: clone with mirror-cache assistance, multi-URL and
//! multi-protocol fallback, fetch-and-checkout updates with dirty-tree
//! protection, and clean removal. All git interaction happens through shell
//! command lines run by the [`overture_core::ProcessExecutor`] collaborator,
//! never through a git library, so behavior matches the user's installed git.

pub mod cache;
pub mod commands;
pub mod error;
pub mod fallback;
pub mod git;
pub mod github;
pub mod version;

pub use cache::GitMirrorCache;
pub use commands::{CommandBuilder, Shell};
pub use error::{Result, UrlAttempt, VcsError};
pub use git::{GitDownloader, InstallationSource};
pub use github::GitHubUrl;
pub use version::GitVersionGate;
