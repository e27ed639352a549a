// Unbounded multi-producer / multi-consumer FIFO queue with a close handshake.
//
// One mutex guards both the deque and the `closed` flag so that "is there an
// item, and if not, is the queue finished" is a single atomic check. Waiting
// consumers park on one condvar: `push` wakes one of them, `close` wakes all.

use crate::error::PopError;
use crate::mpmc::cancel::{CancelToken, CANCEL_POLL_INTERVAL};
use crate::MpmcQueue;
use log::{debug, trace};
use std::{
   collections::VecDeque,
   fmt,
   sync::{Condvar, Mutex, MutexGuard, PoisonError},
   time::{Duration, Instant},
};

/*──────────────────────────────────────────────────────────────────────────*/
/*  Queue header                                                            */
/*──────────────────────────────────────────────────────────────────────────*/

struct State<T> {
   items : VecDeque<T>,
   closed: bool,        // OPEN -> CLOSED only
}

pub struct ConcurrentQueue<T> {
   state    : Mutex<State<T>>,
   available: Condvar,  // signalled on push (one) and close (all)
}

impl<T> ConcurrentQueue<T> {
   /// An empty, open queue.
   pub fn new() -> Self {
      Self::with_capacity(0)
   }

   /// An empty, open queue whose deque is pre-sized for `cap` items. The
   /// queue stays unbounded.
   pub fn with_capacity(cap: usize) -> Self {
      Self {
         state: Mutex::new(State {
            items : VecDeque::with_capacity(cap),
            closed: false,
         }),
         available: Condvar::new(),
      }
   }

   // No critical section leaves `State` half-updated; poisoning is ignored.
   #[inline]
   fn lock(&self) -> MutexGuard<'_, State<T>> {
      self.state.lock().unwrap_or_else(PoisonError::into_inner)
   }
}

/*──────────────────────────── producer side ───────────────────────────────*/

impl<T> ConcurrentQueue<T> {
   /// Append `value` at the tail and wake one waiting consumer.
   ///
   /// Pushing into a closed queue is allowed: the item is queued and later
   /// pops drain it as usual.
   pub fn push(&self, value: T) {
      let mut state = self.lock();
      if state.closed {
         debug!("push into closed queue ({} pending)", state.items.len() + 1);
      }
      state.items.push_back(value);
      self.available.notify_one();
   }

   /// Mark the queue as finished and wake every waiting consumer.
   ///
   /// Items already queued stay poppable. Closing twice has no further effect.
   pub fn close(&self) {
      let mut state = self.lock();
      if state.closed {
         trace!("close on already closed queue ignored");
         return;
      }
      state.closed = true;
      debug!("queue closed with {} pending item(s)", state.items.len());
      self.available.notify_all();
   }
}

/*──────────────────────────── consumer side ───────────────────────────────*/

impl<T> ConcurrentQueue<T> {
   /// Block until an item is available and return it, or return `None` once
   /// the queue is closed and drained.
   pub fn pop(&self) -> Option<T> {
      self.wait_pop(None, None).ok()
   }

   /// Take the head without waiting. `None` iff the queue is empty right now,
   /// whether or not it is closed.
   pub fn try_pop(&self) -> Option<T> {
      self.lock().items.pop_front()
   }

   /// Like [`pop`](Self::pop) but gives up after `timeout`.
   pub fn pop_timeout(&self, timeout: Duration) -> Result<T, PopError> {
      // An unrepresentable deadline is as good as none.
      self.wait_pop(Instant::now().checked_add(timeout), None)
   }

   /// Like [`pop`](Self::pop) but gives up at `deadline`.
   pub fn pop_deadline(&self, deadline: Instant) -> Result<T, PopError> {
      self.wait_pop(Some(deadline), None)
   }

   /// Like [`pop`](Self::pop) but returns `Err(Cancelled)` once `token` is
   /// cancelled. The token is checked at least every [`CANCEL_POLL_INTERVAL`].
   pub fn pop_cancellable(&self, token: &CancelToken) -> Result<T, PopError> {
      self.wait_pop(None, Some(token))
   }

   /// Bounded by both an optional deadline and a cancel token, whichever
   /// fires first.
   pub fn pop_deadline_cancellable(
      &self,
      deadline: Option<Instant>,
      token: &CancelToken,
   ) -> Result<T, PopError> {
      self.wait_pop(deadline, Some(token))
   }

   // Predicate loop shared by all blocking pops. An available item is taken
   // before the deadline or token is looked at: a waiter woken by `push` must
   // consume the item it was woken for.
   fn wait_pop(
      &self,
      deadline: Option<Instant>,
      token: Option<&CancelToken>,
   ) -> Result<T, PopError> {
      let mut state = self.lock();
      loop {
         if let Some(item) = state.items.pop_front() {
            return Ok(item);
         }
         if state.closed {
            return Err(PopError::Closed);
         }
         if token.is_some_and(CancelToken::is_cancelled) {
            trace!("pop cancelled");
            return Err(PopError::Cancelled);
         }

         let remaining = match deadline {
            Some(at) => {
               let left = at.saturating_duration_since(Instant::now());
               if left.is_zero() {
                  trace!("pop timed out");
                  return Err(PopError::Timeout);
               }
               Some(left)
            }
            None => None,
         };
         let slice = match (remaining, token) {
            (Some(left), Some(_)) => Some(left.min(CANCEL_POLL_INTERVAL)),
            (Some(left), None)    => Some(left),
            (None, Some(_))       => Some(CANCEL_POLL_INTERVAL),
            (None, None)          => None,
         };

         state = match slice {
            Some(dur) => {
               self.available
                  .wait_timeout(state, dur)
                  .unwrap_or_else(PoisonError::into_inner)
                  .0
            }
            None => self
               .available
               .wait(state)
               .unwrap_or_else(PoisonError::into_inner),
         };
      }
   }
}

/*──────────────────────────── introspection ───────────────────────────────*/

impl<T> ConcurrentQueue<T> {
   /// Snapshot; may be stale as soon as it returns.
   pub fn is_empty(&self) -> bool {
      self.lock().items.is_empty()
   }

   /// Snapshot; may be stale as soon as it returns.
   pub fn len(&self) -> usize {
      self.lock().items.len()
   }

   pub fn is_closed(&self) -> bool {
      self.lock().closed
   }

   /// Blocking iterator: yields until the queue is closed and drained.
   ///
   /// Not fused: a late push into a closed queue makes it yield again.
   pub fn iter(&self) -> Iter<'_, T> {
      Iter { queue: self }
   }

   /// Non-blocking iterator: yields until the queue is momentarily empty.
   pub fn try_iter(&self) -> TryIter<'_, T> {
      TryIter { queue: self }
   }
}

impl<T> Default for ConcurrentQueue<T> {
   fn default() -> Self {
      Self::new()
   }
}

impl<T> fmt::Debug for ConcurrentQueue<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let state = self.lock();
      f.debug_struct("ConcurrentQueue")
         .field("len", &state.items.len())
         .field("closed", &state.closed)
         .finish()
   }
}

/*──────────────────────────────── iterators ───────────────────────────────*/

#[derive(Debug)]
pub struct Iter<'a, T> {
   queue: &'a ConcurrentQueue<T>,
}

impl<T> Iterator for Iter<'_, T> {
   type Item = T;

   fn next(&mut self) -> Option<T> {
      self.queue.pop()
   }
}

#[derive(Debug)]
pub struct TryIter<'a, T> {
   queue: &'a ConcurrentQueue<T>,
}

impl<T> Iterator for TryIter<'_, T> {
   type Item = T;

   fn next(&mut self) -> Option<T> {
      self.queue.try_pop()
   }
}

impl<'a, T> IntoIterator for &'a ConcurrentQueue<T> {
   type Item = T;
   type IntoIter = Iter<'a, T>;

   fn into_iter(self) -> Iter<'a, T> {
      self.iter()
   }
}

/*──────────────────────────── common interface ────────────────────────────*/

impl<T: Send> MpmcQueue<T> for ConcurrentQueue<T> {
   #[inline]
   fn push(&self, item: T) {
      ConcurrentQueue::push(self, item)
   }

   #[inline]
   fn pop(&self) -> Option<T> {
      ConcurrentQueue::pop(self)
   }

   #[inline]
   fn try_pop(&self) -> Option<T> {
      ConcurrentQueue::try_pop(self)
   }

   #[inline]
   fn close(&self) {
      ConcurrentQueue::close(self)
   }

   #[inline]
   fn is_empty(&self) -> bool {
      ConcurrentQueue::is_empty(self)
   }

   #[inline]
   fn len(&self) -> usize {
      ConcurrentQueue::len(self)
   }
}
