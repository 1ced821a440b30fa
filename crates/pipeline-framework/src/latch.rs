//! # One-way Latch
//!
//! A latch starts unset and can be set exactly once; it is never reset.
//! Lifecycle phases ("open", "closing", "stopped") are each modelled as a
//! latch that one task sets and any number of tasks observe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    set: AtomicBool,
    notify: Notify,
}

/// A cloneable one-way signal.
#[derive(Clone, Default)]
pub struct Latch {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Latch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Latch").field("set", &self.is_set()).finish()
    }
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the latch and wakes every waiter.
    ///
    /// Returns `true` only for the call that performed the transition; later
    /// calls are no-ops.
    pub fn set(&self) -> bool {
        let first = !self.inner.set.swap(true, Ordering::SeqCst);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    pub fn is_set(&self) -> bool {
        self.inner.set.load(Ordering::SeqCst)
    }

    /// Suspends until the latch is set. Returns immediately if it already is.
    pub async fn wait(&self) {
        loop {
            // Register before checking so a concurrent set() cannot slip in
            // between the check and the await.
            let notified = self.inner.notify.notified();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_set_transitions_once() {
        let latch = Latch::new();
        assert!(!latch.is_set());
        assert!(latch.set());
        assert!(!latch.set());
        assert!(latch.is_set());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_set() {
        let latch = Latch::new();
        latch.set();
        latch.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_wakes_all_waiters() {
        let latch = Latch::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let latch = latch.clone();
                tokio::spawn(async move { latch.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(waiters.iter().all(|w| !w.is_finished()));

        latch.set();
        for waiter in waiters {
            waiter.await.unwrap();
        }
    }
}
