//! Opaque progress reporting for long-running batch operations.
//!
//! `add_documents` may process thousands of documents across many
//! embedding-oracle round trips; callers that want a progress bar implement
//! this trait rather than the core depending on any particular UI crate.

/// Receives batch-completion notifications during `add_documents`.
pub trait ProgressSink: Send + Sync {
    /// Called after each batch commits, with the running and total count.
    fn on_batch(&self, completed: usize, total: usize);
}

/// A [`ProgressSink`] that does nothing, used when the caller passes `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_batch(&self, _completed: usize, _total: usize) {}
}
