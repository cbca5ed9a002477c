//! Core collaborators for the Overture source acquisition engine.
//!
//! This crate carries the pieces the VCS layer is built on top of: package
//! descriptors, user configuration, the shell process runner, filesystem
//! helpers and the advisory message reporter. None of these know anything
//! about git; they are the seams through which the engine talks to the
//! outside world (and through which tests script it).

pub mod config;
pub mod error;
pub mod fs;
pub mod package;
pub mod process;
pub mod report;

pub use config::{Config, GitProtocol};
pub use error::{CoreError, Result};
pub use fs::Filesystem;
pub use package::PackageDescriptor;
pub use process::{ProcessExecutor, ShellExecutor};
pub use report::{LogReporter, Reporter};
