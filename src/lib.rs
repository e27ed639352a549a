pub mod error;
pub mod mpmc;

pub use error::PopError;
pub use mpmc::CancelToken;
pub use mpmc::ConcurrentQueue;

/// Common interface for closable multi-producer / multi-consumer queues.
pub trait MpmcQueue<T: Send>: Send + Sync {
   /// Append `item` at the tail. Never fails.
   fn push(&self, item: T);
   /// Block until an item arrives, or return `None` once closed and drained.
   fn pop(&self) -> Option<T>;
   /// Take the head if there is one, without waiting.
   fn try_pop(&self) -> Option<T>;

   /// Signal that no more items will be pushed.
   fn close(&self);
   fn is_empty(&self) -> bool;
   fn len(&self) -> usize;
}
