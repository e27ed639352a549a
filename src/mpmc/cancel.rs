// Per-call cancellation for blocking pops.
use std::{
   sync::{
      atomic::{AtomicBool, Ordering},
      Arc,
   },
   time::Duration,
};

/// Upper bound on how long a cancellable waiter sleeps before it looks at its
/// token again.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable handle that lets one thread abandon another thread's wait.
///
/// Clones share the same flag. Once cancelled a token stays cancelled; a
/// fresh token is needed for the next wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
   cancelled: Arc<AtomicBool>,
}

impl CancelToken {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn cancel(&self) {
      self.cancelled.store(true, Ordering::Release);
   }

   #[inline]
   pub fn is_cancelled(&self) -> bool {
      self.cancelled.load(Ordering::Acquire)
   }
}
