mod cancel;
mod concurrent;

pub use cancel::{CancelToken, CANCEL_POLL_INTERVAL};
pub use concurrent::{ConcurrentQueue, Iter, TryIter};
