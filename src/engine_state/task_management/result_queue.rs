//! Typed result channels between worker threads and the main thread.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// A multi-producer queue of results of one kind, drained by the main thread.
///
/// Result queues are unbounded so that a worker finishing a task never waits
/// on the main thread; the number of outstanding results is already limited
/// by the bounded task queue and the per-frame submission throttles.
#[derive(Debug)]
pub struct ResultQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> Clone for ResultQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
        }
    }
}

impl<T> ResultQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Publishes a result. Never blocks.
    pub fn push(&self, item: T) {
        // Both ends live in every clone, so the channel cannot be disconnected.
        let _ = self.sender.send(item);
    }

    /// Takes every result currently available without waiting for more.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Number of results waiting to be drained.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no result is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T> Default for ResultQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
