//! The condition queue.
//!
//! This module provides [`BlockingQueue`], a mutex/condvar-coordinated FIFO
//! handoff point between producer and consumer threads, and [`Outcome`], the
//! tagged result of its retrieval operations.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::buffer::Buffer;

/// The result of a dequeue attempt.
///
/// Retrieval never panics; every way a `wait`, `wait_for`, or `try_pop` call
/// can end is one of these three tags, and callers are expected to match on
/// all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The front item was removed from the queue.
    Item(T),
    /// The queue was cancelled before an item could be taken. Items already
    /// in the queue are left untouched.
    Canceled,
    /// No item became available in time: the deadline passed (`wait_for`) or
    /// the queue was empty at the instant of the call (`try_pop`).
    TimedOut,
}

impl<T> Outcome<T> {
    /// Returns `true` if the outcome carries an item.
    pub fn is_item(&self) -> bool {
        matches!(self, Outcome::Item(_))
    }

    /// Returns the dequeued item, if any.
    pub fn item(self) -> Option<T> {
        match self {
            Outcome::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// Everything the lock guards: the item sequence and the cancellation flag
/// live behind one mutex so a waiter observes them together.
struct Inner<B> {
    items: B,
    cancelled: bool,
}

/// A thread-safe blocking FIFO queue with cooperative cancellation.
///
/// Any number of producer threads `push` items; consumer threads take them
/// out in strict insertion order through one of three disciplines: [`wait`]
/// (block until an item or cancellation), [`wait_for`] (block up to a
/// deadline), or [`try_pop`] (never block). [`cancel`] releases every blocked
/// waiter without consuming or discarding items and keeps subsequent waits
/// from blocking until [`reset`] is called.
///
/// The queue owns no threads. Share it across threads behind an
/// `Arc<BlockingQueue<T>>`; a waiter borrows the queue for the duration of
/// the call, so the queue cannot be dropped while a thread is parked in it.
/// For orderly shutdown, `cancel` first so waiters return, then join the
/// consumer threads.
///
/// `push` wakes exactly one waiter; `cancel` wakes them all. A panic in
/// another thread while it holds the internal lock does not disable the
/// queue: the poisoned lock is recovered and coordination keeps working.
///
/// The second type parameter selects the backing container (any
/// [`Buffer`] implementation); it defaults to `VecDeque<T>`.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use waitq_lib::queue::{BlockingQueue, Outcome};
///
/// let queue = Arc::new(BlockingQueue::<i32>::new());
/// let consumer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || queue.wait())
/// };
/// queue.push(42);
/// assert_eq!(consumer.join().unwrap(), Outcome::Item(42));
///
/// queue.cancel();
/// assert_eq!(queue.wait(), Outcome::Canceled);
/// ```
///
/// [`wait`]: BlockingQueue::wait
/// [`wait_for`]: BlockingQueue::wait_for
/// [`try_pop`]: BlockingQueue::try_pop
/// [`cancel`]: BlockingQueue::cancel
/// [`reset`]: BlockingQueue::reset
pub struct BlockingQueue<T, B = VecDeque<T>> {
    inner: Mutex<Inner<B>>,
    signal: Condvar,
    /// The struct is parametrized by the element type (`T`); the items
    /// themselves live in the backing container.
    marker: PhantomData<fn(T) -> T>,
}

impl<T, B: Buffer<T>> BlockingQueue<T, B> {
    /// Creates an empty, active queue with a default backing container.
    pub fn new() -> Self
    where
        B: Default,
    {
        Self::with_buffer(B::default())
    }

    /// Creates a queue over a caller-supplied backing container. Items
    /// already in `buffer` are retrievable in its front-to-back order.
    pub fn with_buffer(buffer: B) -> Self {
        BlockingQueue {
            inner: Mutex::new(Inner {
                items: buffer,
                cancelled: false,
            }),
            signal: Condvar::new(),
            marker: PhantomData,
        }
    }

    /// Appends `item` at the back of the queue and wakes one blocked waiter,
    /// if any. Never blocks beyond lock acquisition; always succeeds.
    pub fn push(&self, item: T) {
        let mut inner = self.lock();
        inner.items.push_back(item);
        drop(inner);
        self.signal.notify_one();
    }

    /// Blocks until the queue is non-empty or cancelled.
    ///
    /// Returns [`Outcome::Item`] with the front item, or [`Outcome::Canceled`]
    /// if the queue is (or becomes) cancelled — cancellation takes priority
    /// and leaves any queued items untouched. Never returns
    /// [`Outcome::TimedOut`].
    pub fn wait(&self) -> Outcome<T> {
        let mut inner = self.lock();
        loop {
            if inner.cancelled {
                return Outcome::Canceled;
            }
            if let Some(item) = inner.items.pop_front() {
                return Outcome::Item(item);
            }
            // The guard is released while parked and re-acquired on wake;
            // the loop re-checks the predicate after every wakeup.
            inner = self.wait_signal(inner);
        }
    }

    /// Like [`wait`](BlockingQueue::wait), but gives up after `timeout` and
    /// returns [`Outcome::TimedOut`] with the queue unmodified.
    ///
    /// The deadline is fixed once at entry; spurious wakeups re-wait only for
    /// the time remaining, so the total wait never exceeds `timeout` by more
    /// than scheduling overhead. A zero `timeout` degenerates to a poll that
    /// still reports cancellation first.
    pub fn wait_for(&self, timeout: Duration) -> Outcome<T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut inner = self.lock();
        loop {
            if inner.cancelled {
                return Outcome::Canceled;
            }
            if let Some(item) = inner.items.pop_front() {
                return Outcome::Item(item);
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                return Outcome::TimedOut;
            }
            inner = self.wait_signal_timeout(inner, remaining);
        }
    }

    /// Removes and returns the front item without blocking.
    ///
    /// Returns [`Outcome::Item`] whenever the queue is non-empty, even when
    /// cancelled — pending items stay drainable so cancellation never
    /// destroys work. On an empty queue it returns [`Outcome::TimedOut`]
    /// regardless of the cancellation flag: a poll reports availability, not
    /// the reason for unavailability.
    pub fn try_pop(&self) -> Outcome<T> {
        let mut inner = self.lock();
        match inner.items.pop_front() {
            Some(item) => Outcome::Item(item),
            None => Outcome::TimedOut,
        }
    }

    /// Cancels the queue: every blocked waiter wakes and returns
    /// [`Outcome::Canceled`], and subsequent waits return immediately until
    /// [`reset`](BlockingQueue::reset). Queued items are not removed.
    /// Idempotent.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        inner.cancelled = true;
        drop(inner);
        self.signal.notify_all();
    }

    /// Clears the cancellation flag so subsequent waits block normally
    /// again. Wakes no one.
    pub fn reset(&self) {
        self.lock().cancelled = false;
    }

    /// Discards all queued items. The cancellation flag is not affected.
    pub fn clear(&self) {
        self.lock().items.clear();
    }

    /// Returns whether the queue is currently cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Returns the number of queued items. Advisory under concurrency: the
    /// count may change before the caller acts on it.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Acquires the lock, recovering the guard if another thread panicked
    /// while holding it.
    fn lock(&self) -> MutexGuard<'_, Inner<B>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn wait_signal<'a>(&self, guard: MutexGuard<'a, Inner<B>>) -> MutexGuard<'a, Inner<B>> {
        match self.signal.wait(guard) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn wait_signal_timeout<'a>(
        &self,
        guard: MutexGuard<'a, Inner<B>>,
        timeout: Duration,
    ) -> MutexGuard<'a, Inner<B>> {
        match self.signal.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

impl<T, B: Buffer<T> + Default> Default for BlockingQueue<T, B> {
    fn default() -> Self {
        Self::new()
    }
}
