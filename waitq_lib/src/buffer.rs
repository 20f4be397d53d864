//! Backing containers for the condition queue.
//!
//! [`BlockingQueue`](crate::queue::BlockingQueue) stores its items in any
//! type implementing [`Buffer`]. The default is `VecDeque`, which covers the
//! common case; a custom implementation can swap in a different ordering or
//! storage strategy without touching the coordination logic.

use std::collections::VecDeque;

/// A FIFO container the queue can store items in.
///
/// The queue calls these methods only while holding its internal lock, so
/// implementations need no synchronization of their own. `pop_front` must
/// return items in the order `push_back` inserted them for the queue to keep
/// its ordering guarantee.
pub trait Buffer<T> {
    /// Appends an item at the back.
    fn push_back(&mut self, item: T);

    /// Removes and returns the front item, or `None` if empty.
    fn pop_front(&mut self) -> Option<T>;

    /// Returns a reference to the front item without removing it.
    fn front(&self) -> Option<&T>;

    /// Returns the number of stored items.
    fn len(&self) -> usize;

    /// Returns whether the container holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every stored item.
    fn clear(&mut self);
}

impl<T> Buffer<T> for VecDeque<T> {
    fn push_back(&mut self, item: T) {
        VecDeque::push_back(self, item);
    }

    fn pop_front(&mut self) -> Option<T> {
        VecDeque::pop_front(self)
    }

    fn front(&self) -> Option<&T> {
        VecDeque::front(self)
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn is_empty(&self) -> bool {
        VecDeque::is_empty(self)
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}
