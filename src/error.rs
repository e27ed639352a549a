//! Outcomes of a bounded wait on a queue.

/// Why a timed or cancellable pop returned without an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PopError {
   #[error("timed out waiting for an item")]
   Timeout,

   #[error("wait was cancelled")]
   Cancelled,

   /// Closed and drained: no item will ever arrive.
   #[error("queue is closed and empty")]
   Closed,
}
