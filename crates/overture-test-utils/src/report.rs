//! Notice recording for tests.

use parking_lot::Mutex;

use overture_core::Reporter;

/// [`Reporter`] that keeps every notice for later assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    notices: Mutex<Vec<String>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices reported so far, in order.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }

    /// Whether any notice contains `needle`.
    #[must_use]
    pub fn saw(&self, needle: &str) -> bool {
        self.notices.lock().iter().any(|n| n.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn notice(&self, message: &str) {
        self.notices.lock().push(message.to_owned());
    }
}
