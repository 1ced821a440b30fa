//! # Hand-off Queue
//!
//! An unbounded FIFO shared between producer and consumer tasks.
//!
//! `push` never waits. `pop` suspends until an item is available, and
//! `pop_timeout` gives up after a deadline with [`FrameworkError::Timeout`].
//! The queue also keeps a count of items that were pushed but not yet
//! acknowledged with [`HandoffQueue::task_done`], which lets a consumer
//! mark an item as fully handled once it has left the queue.

use crate::error::FrameworkError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

struct Shared<T> {
    items: Mutex<VecDeque<T>>,
    unfinished: Mutex<usize>,
    available: Notify,
}

/// A cloneable handle to a shared FIFO.
///
/// Clones refer to the same storage. The internal lock is synchronous and is
/// never held across an `.await`, so the queue primitive is safe to use from
/// any number of tasks without external locking.
pub struct HandoffQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for HandoffQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HandoffQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffQueue")
            .field("len", &self.len())
            .field("unfinished", &self.unfinished())
            .finish()
    }
}

impl<T> HandoffQueue<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(VecDeque::new()),
                unfinished: Mutex::new(0),
                available: Notify::new(),
            }),
        }
    }

    /// Appends an item and wakes one waiting consumer. Returns the new length.
    pub fn push(&self, item: T) -> usize {
        let len = {
            let mut items = self.shared.items.lock();
            items.push_back(item);
            items.len()
        };
        *self.shared.unfinished.lock() += 1;
        self.shared.available.notify_one();
        len
    }

    /// Removes the oldest item, suspending until one is pushed.
    pub async fn pop(&self) -> T {
        loop {
            if let Some(item) = self.try_pop() {
                return item;
            }
            // notify_one stores a permit when nobody is waiting, so a push
            // landing between try_pop and here is not missed.
            self.shared.available.notified().await;
        }
    }

    /// Like [`pop`](Self::pop) but gives up after `timeout`.
    pub async fn pop_timeout(&self, timeout: Duration) -> Result<T, FrameworkError> {
        tokio::time::timeout(timeout, self.pop())
            .await
            .map_err(|_| FrameworkError::Timeout(timeout))
    }

    /// Removes the oldest item if there is one, without suspending.
    pub fn try_pop(&self) -> Option<T> {
        self.shared.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.shared.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.items.lock().is_empty()
    }

    /// Marks one previously pushed item as fully handled.
    pub fn task_done(&self) -> Result<(), FrameworkError> {
        let mut unfinished = self.shared.unfinished.lock();
        if *unfinished == 0 {
            return Err(FrameworkError::TaskDoneOverflow);
        }
        *unfinished -= 1;
        Ok(())
    }

    /// Items pushed and not yet acknowledged, including ones already popped.
    pub fn unfinished(&self) -> usize {
        *self.shared.unfinished.lock()
    }
}
