//! # Task System Core Trait
//!
//! A `Task` is a self-contained unit of background work. It owns everything it
//! needs (immutable voxel snapshots, shared collaborators behind `Arc`) and
//! reports its outcome by pushing into a typed
//! [`ResultQueue`](super::result_queue::ResultQueue) that the main thread
//! drains once per frame.
//!
//! ## Task Lifecycle
//! 1. A task is created on the main thread and submitted via `TaskManager::submit()`
//! 2. A worker thread takes it off the shared queue and calls `process()`
//! 3. The task pushes its result into the queue it was constructed with
//! 4. The main thread applies the result on its next frame

/// A unit of work executed on a worker thread.
///
/// # Implementation Guidelines
/// - Must be `Send` to be transferred between threads
/// - Must not reach back into main-thread state; work only on owned snapshots
/// - Should be coarse-grained (one chunk) to amortize scheduling overhead
pub trait Task: Send {
    /// Runs the task, consuming it.
    fn process(self: Box<Self>);

    /// Short label used in log messages.
    fn name(&self) -> &'static str {
        "task"
    }
}

/// Adapter that runs a plain closure as a [`Task`].
pub struct ClosureTask<F>(pub F);

impl<F> Task for ClosureTask<F>
where
    F: FnOnce() + Send,
{
    fn process(self: Box<Self>) {
        (self.0)()
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
