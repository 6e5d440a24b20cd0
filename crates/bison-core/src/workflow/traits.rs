//! Seams between the item loop and its collaborators

use super::observer::ExecutionEvent;

/// Receives everything handlers have to say
///
/// Handlers never write to the console directly. The default
/// [`LogObserver`](super::observer::LogObserver) forwards events to `log`;
/// tests use [`MemoryObserver`](super::observer::MemoryObserver) to assert on
/// what was reported.
pub trait ExecutionObserver: Send + Sync {
    fn record(&self, event: ExecutionEvent);
}
