//! Collaborator doubles.

use crate::session::ClipboardPort;
use crate::{PixError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Clipboard that rejects every copy, counting the attempts.
#[derive(Debug)]
pub struct FailingClipboard {
    reason: String,
    attempts: AtomicUsize,
}

impl FailingClipboard {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of copy attempts so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ClipboardPort for FailingClipboard {
    fn copy(&self, _text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PixError::Clipboard(self.reason.clone()))
    }
}
