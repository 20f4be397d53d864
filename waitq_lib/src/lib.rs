//! waitq is a blocking FIFO queue with timed waits and cooperative cancellation.

#![deny(missing_docs)]

pub mod buffer;
pub mod dispatch;
pub mod queue;
