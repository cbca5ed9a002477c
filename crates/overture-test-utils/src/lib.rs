//! Testing utilities for Overture.
//!
//! Provides scripted stand-ins for the process and reporter collaborators so
//! engine tests can dictate exact command sequences and observe every notice.

pub mod process;
pub mod report;

pub use process::{Invocation, ScriptedExecutor};
pub use report::RecordingReporter;
