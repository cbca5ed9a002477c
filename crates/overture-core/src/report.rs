//! Advisory progress reporting.

use tracing::info;

/// Sink for advisory notices emitted during long-running operations.
///
/// Notices never influence control flow; an engine wired to a reporter that
/// drops everything behaves identically.
pub trait Reporter: Send + Sync {
    /// Reports a human-facing progress or warning message.
    fn notice(&self, message: &str);
}

/// [`Reporter`] that forwards notices to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn notice(&self, message: &str) {
        info!("{message}");
    }
}
