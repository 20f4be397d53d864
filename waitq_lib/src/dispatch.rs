//! A dispatcher of deferred work built on the condition queue.
//!
//! [`Dispatcher`] is the crate's own consumer of [`BlockingQueue`]: producers
//! post closures from any thread and worker threads execute them in posting
//! order. It doubles as a reference for wiring the queue into a real
//! producer/consumer setup, including shutdown.

use std::sync::Arc;
use std::time::Duration;

use crate::queue::{BlockingQueue, Outcome};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send>;

/// A cloneable handle to a shared task queue.
///
/// Clones share the same underlying queue, so any clone can post work and any
/// clone can execute it. Workers typically loop in [`run`](Dispatcher::run)
/// on a dedicated thread; callers with their own schedule take single steps
/// with [`run_one_for`](Dispatcher::run_one_for) or opportunistic batches
/// with [`drain`](Dispatcher::drain).
///
/// Panics are not caught: a task that panics unwinds the thread executing it.
/// The shared queue survives, and the remaining clones keep working.
#[derive(Clone)]
pub struct Dispatcher {
    queue: Arc<BlockingQueue<Task>>,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty task queue.
    pub fn new() -> Self {
        Dispatcher {
            queue: Arc::new(BlockingQueue::new()),
        }
    }

    /// Posts a task for later execution. Tasks run in posting order.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(task));
    }

    /// Executes posted tasks until the dispatcher is shut down, blocking
    /// while the queue is empty. Tasks posted after shutdown stay queued;
    /// they can still be [`drain`](Dispatcher::drain)ed or discarded.
    pub fn run(&self) {
        while let Outcome::Item(task) = self.queue.wait() {
            task();
        }
    }

    /// Waits up to `timeout` for one task and executes it. Returns whether a
    /// task ran; timing out and shutdown both return `false`.
    pub fn run_one_for(&self, timeout: Duration) -> bool {
        match self.queue.wait_for(timeout) {
            Outcome::Item(task) => {
                task();
                true
            }
            Outcome::Canceled | Outcome::TimedOut => false,
        }
    }

    /// Executes every task currently queued without blocking and returns how
    /// many ran. Works before and after shutdown.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Outcome::Item(task) = self.queue.try_pop() {
            task();
            ran += 1;
        }
        ran
    }

    /// Shuts the dispatcher down: every blocked worker returns from
    /// [`run`](Dispatcher::run), and new `run` calls return immediately.
    /// Queued tasks are kept.
    pub fn shutdown(&self) {
        self.queue.cancel();
    }

    /// Returns whether the dispatcher is shut down.
    pub fn is_shutdown(&self) -> bool {
        self.queue.is_cancelled()
    }

    /// Reopens a shut-down dispatcher so workers block on the queue again.
    pub fn reopen(&self) {
        self.queue.reset();
    }

    /// Drops all queued tasks without running them.
    pub fn discard_pending(&self) {
        self.queue.clear();
    }

    /// Returns the number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn drain_runs_tasks_in_posting_order() {
        let dispatcher = Dispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let log = Arc::clone(&log);
            dispatcher.post(move || log.lock().unwrap().push(i));
        }
        assert_eq!(dispatcher.pending(), 5);
        assert_eq!(dispatcher.drain(), 5);
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn worker_runs_until_shutdown() {
        let dispatcher = Dispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let (started, start_signal) = mpsc::channel();
        let worker = {
            let dispatcher = dispatcher.clone();
            thread::spawn(move || {
                started.send(()).unwrap();
                dispatcher.run();
            })
        };
        start_signal.recv().unwrap();

        let (done, done_signal) = mpsc::channel();
        for i in 0..3 {
            let log = Arc::clone(&log);
            let done = done.clone();
            dispatcher.post(move || {
                log.lock().unwrap().push(i);
                if i == 2 {
                    done.send(()).unwrap();
                }
            });
        }
        done_signal.recv().unwrap();
        dispatcher.shutdown();
        worker.join().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn run_one_for_times_out_on_empty() {
        let dispatcher = Dispatcher::new();
        assert!(!dispatcher.run_one_for(Duration::from_millis(20)));

        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let log = Arc::clone(&log);
            dispatcher.post(move || log.lock().unwrap().push("ran"));
        }
        assert!(dispatcher.run_one_for(Duration::from_millis(20)));
        assert_eq!(*log.lock().unwrap(), vec!["ran"]);
    }

    #[test]
    fn shutdown_keeps_queued_tasks_drainable() {
        let dispatcher = Dispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let log = Arc::clone(&log);
            dispatcher.post(move || log.lock().unwrap().push("late"));
        }
        dispatcher.shutdown();
        assert!(dispatcher.is_shutdown());
        assert!(!dispatcher.run_one_for(Duration::from_millis(5)));
        assert_eq!(dispatcher.drain(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn reopen_restores_blocking_workers() {
        let dispatcher = Dispatcher::new();
        dispatcher.shutdown();
        dispatcher.reopen();
        assert!(!dispatcher.is_shutdown());

        let worker = {
            let dispatcher = dispatcher.clone();
            thread::spawn(move || dispatcher.run_one_for(Duration::from_secs(5)))
        };
        dispatcher.post(|| {});
        assert!(worker.join().unwrap());
    }

    #[test]
    fn discard_pending_drops_without_running() {
        let dispatcher = Dispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let log = Arc::clone(&log);
            dispatcher.post(move || log.lock().unwrap().push("never"));
        }
        dispatcher.discard_pending();
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(dispatcher.drain(), 0);
        assert!(log.lock().unwrap().is_empty());
    }
}
