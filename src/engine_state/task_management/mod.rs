//! # Task Management System
//!
//! A fixed pool of worker threads draining one bounded task queue. The main
//! thread is the only producer; workers are the consumers.
//!
//! ## Architecture Overview
//! - `TaskManager`: owns the worker threads and the sending end of the task queue
//! - `Task`: a unit of work executed on a worker thread
//! - `ResultQueue`: typed channel a task reports its outcome through
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::submit()`
//! 2. An idle worker takes the oldest task from the queue and runs it
//! 3. The task pushes its result into a `ResultQueue`
//! 4. The main thread drains result queues once per frame
//!
//! ## Backpressure
//! When the task queue is full `submit()` waits on the channel in short,
//! bounded slices until a worker frees a slot. Tasks are never dropped.
//! Workers block only while waiting for the next task.
//!
//! ## Example Usage
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use voxel_stream::engine_state::task_management::TaskManager;
//!
//! let task_manager = TaskManager::new(2, 8);
//! let counter = Arc::new(AtomicUsize::new(0));
//! for _ in 0..32 {
//!     let counter = counter.clone();
//!     task_manager.spawn(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     });
//! }
//! task_manager.wait_idle();
//! assert_eq!(counter.load(Ordering::SeqCst), 32);
//! ```

pub mod result_queue;
pub mod task;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use log::{error, info, trace};

use task::{ClosureTask, Task};

/// How long a blocked `submit()` waits on a full queue before logging and retrying.
const SUBMIT_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Count of submitted tasks that have not finished yet.
#[derive(Default)]
struct PendingTasks {
    count: Mutex<usize>,
    idle: Condvar,
}

impl PendingTasks {
    fn begin(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn current(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_for_zero(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Manages a pool of worker threads and the bounded queue feeding them.
///
/// Dropping the manager closes the queue, lets the workers finish what is
/// already queued and joins them.
pub struct TaskManager {
    task_sender: Option<Sender<Box<dyn Task>>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<PendingTasks>,
    capacity: usize,
}

impl TaskManager {
    /// Creates a manager with `num_workers` threads and a queue holding at most
    /// `capacity` waiting tasks.
    ///
    /// Both values are raised to at least 1.
    pub fn new(num_workers: usize, capacity: usize) -> Self {
        let num_workers = num_workers.max(1);
        let capacity = capacity.max(1);
        let (task_sender, task_receiver) = bounded::<Box<dyn Task>>(capacity);
        let pending = Arc::new(PendingTasks::default());

        info!(
            "Starting {num_workers} workers, queue capacity {capacity}, parallelism {:?}",
            thread::available_parallelism()
        );

        let workers = (0..num_workers)
            .filter_map(|index| {
                let receiver = task_receiver.clone();
                let pending = pending.clone();
                thread::Builder::new()
                    .name(format!("voxel-worker-{index}"))
                    .spawn(move || worker_loop(receiver, pending))
                    .map_err(|err| error!("Failed to spawn worker {index}: {err}"))
                    .ok()
            })
            .collect();

        TaskManager {
            task_sender: Some(task_sender),
            workers,
            pending,
            capacity,
        }
    }

    /// Publishes a task for background execution.
    ///
    /// Returns immediately when the queue has room. Otherwise waits for a
    /// worker to free a slot, retrying until the task is accepted.
    pub fn submit(&self, task: Box<dyn Task>) {
        let Some(sender) = &self.task_sender else {
            error!("Task '{}' submitted after shutdown, dropping it", task.name());
            return;
        };

        self.pending.begin();
        let mut task = match sender.try_send(task) {
            Ok(()) => return,
            Err(TrySendError::Full(task)) => task,
            Err(TrySendError::Disconnected(task)) => {
                self.pending.finish();
                error!("All workers exited, dropping task '{}'", task.name());
                return;
            }
        };

        let mut retries = 0usize;
        loop {
            match sender.send_timeout(task, SUBMIT_RETRY_INTERVAL) {
                Ok(()) => return,
                Err(SendTimeoutError::Timeout(returned)) => {
                    retries += 1;
                    trace!(
                        "Task queue full ({} waiting), retry {retries} for '{}'",
                        self.capacity,
                        returned.name()
                    );
                    task = returned;
                }
                Err(SendTimeoutError::Disconnected(returned)) => {
                    self.pending.finish();
                    error!("All workers exited, dropping task '{}'", returned.name());
                    return;
                }
            }
        }
    }

    /// Publishes a closure for background execution.
    pub fn spawn<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(ClosureTask(work)));
    }

    /// Blocks until every task submitted so far has finished.
    ///
    /// Only meant for deterministic teardown and tests, never for the frame loop.
    pub fn wait_idle(&self) {
        self.pending.wait_for_zero();
    }

    /// Number of submitted tasks that have not finished.
    pub fn pending_tasks(&self) -> usize {
        self.pending.current()
    }

    /// Number of running worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Maximum number of tasks waiting in the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn worker_loop(receiver: Receiver<Box<dyn Task>>, pending: Arc<PendingTasks>) {
    while let Ok(task) = receiver.recv() {
        let name = task.name();
        if panic::catch_unwind(AssertUnwindSafe(|| task.process())).is_err() {
            error!("Background task '{name}' panicked");
        }
        pending.finish();
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        // Closing the sender ends every worker loop once the queue is empty.
        self.task_sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("Worker thread exited with a panic");
            }
        }
        info!("Task manager stopped");
    }
}
