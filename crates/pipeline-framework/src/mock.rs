//! # Test Doubles
//!
//! | Double | Stands in for | Lets you check |
//! |--------|---------------|----------------|
//! | [`MockSource`] | a timed feed | how often `next()` ran, and whether two callers were ever inside it at once |
//! | [`SharedBuffer`] | the journal file | the exact lines written, in order |
//!
//! ## Scripting a source
//!
//! ```rust
//! use pipeline_framework::mock::MockSource;
//! use pipeline_framework::Source;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut source = MockSource::new();
//!     source.expect_next().return_item("espresso");
//!     source.expect_next().after(Duration::from_millis(5)).return_item("latte");
//!
//!     let stats = source.stats();
//!     assert_eq!(source.next().await, Some("espresso"));
//!     assert_eq!(source.next().await, Some("latte"));
//!     assert_eq!(source.next().await, None);
//!
//!     stats.verify();
//!     assert_eq!(stats.calls(), 3);
//! }
//! ```

use crate::source::Source;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// SCRIPTED SOURCE
// =============================================================================

/// One scripted answer to `next()`.
struct Expectation<T> {
    delay: Duration,
    item: T,
}

#[derive(Default)]
struct Counters {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pending: AtomicUsize,
}

/// Call statistics shared between a [`MockSource`] and the test.
#[derive(Clone, Default)]
pub struct MockSourceStats {
    counters: Arc<Counters>,
}

impl MockSourceStats {
    /// Total `next()` calls, including ones that returned `None`.
    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    /// The largest number of `next()` calls that were in progress at once.
    pub fn max_concurrent(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    /// Panics if scripted items were never handed out.
    pub fn verify(&self) {
        let pending = self.counters.pending.load(Ordering::SeqCst);
        if pending != 0 {
            panic!("Not all expectations were met. {} remaining", pending);
        }
    }
}

/// A scripted [`Source`]: each expectation answers one `next()` call, after
/// an optional delay. Once the script runs out, `next()` returns `None`.
///
/// Clones share the script and the statistics, so handing clones to several
/// tasks without a lock shows up as `max_concurrent() > 1`.
pub struct MockSource<T> {
    script: Arc<Mutex<VecDeque<Expectation<T>>>>,
    stats: MockSourceStats,
}

impl<T> Clone for MockSource<T> {
    fn clone(&self) -> Self {
        Self {
            script: self.script.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<T: Send + 'static> Default for MockSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> MockSource<T> {
    /// Creates a source with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            stats: MockSourceStats::default(),
        }
    }

    /// A source that hands out `items` immediately, in order.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut source = Self::new();
        for item in items {
            source.expect_next().return_item(item);
        }
        source
    }

    /// Expects a `next()` call.
    pub fn expect_next(&mut self) -> NextExpectationBuilder<T> {
        NextExpectationBuilder {
            delay: Duration::ZERO,
            script: self.script.clone(),
            stats: self.stats.clone(),
        }
    }

    /// Returns the statistics handle; keep it to inspect after the source has
    /// been moved into the code under test.
    pub fn stats(&self) -> MockSourceStats {
        self.stats.clone()
    }
}

/// Builder for `next()` expectations.
pub struct NextExpectationBuilder<T> {
    delay: Duration,
    script: Arc<Mutex<VecDeque<Expectation<T>>>>,
    stats: MockSourceStats,
}

impl<T> NextExpectationBuilder<T> {
    /// Makes the call take `delay` before answering.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the item the call returns.
    pub fn return_item(self, item: T) {
        self.script.lock().push_back(Expectation {
            delay: self.delay,
            item,
        });
        self.stats.counters.pending.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<T: Send + 'static> Source<T> for MockSource<T> {
    async fn next(&mut self) -> Option<T> {
        let counters = &self.stats.counters;
        counters.calls.fetch_add(1, Ordering::SeqCst);
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let next = self.script.lock().pop_front();
        let item = match next {
            Some(expectation) => {
                tokio::time::sleep(expectation.delay).await;
                counters.pending.fetch_sub(1, Ordering::SeqCst);
                Some(expectation.item)
            }
            None => None,
        };

        counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        item
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.script.lock().len())
    }
}

// =============================================================================
// IN-MEMORY SINK
// =============================================================================

/// A cloneable in-memory `Write` sink.
#[derive(Clone, Default, Debug)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex as AsyncMutex;

    #[tokio::test]
    async fn test_script_then_end_marker() {
        let mut source = MockSource::from_items([1, 2]);
        assert_eq!(source.remaining(), Some(2));
        assert_eq!(source.next().await, Some(1));
        assert_eq!(source.next().await, Some(2));
        assert_eq!(source.next().await, None);
        assert_eq!(source.next().await, None);
        source.stats().verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_panics_on_unused_script() {
        let source = MockSource::from_items(["left over"]);
        source.stats().verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_detects_overlapping_callers() {
        let mut left = MockSource::new();
        left.expect_next().after(Duration::from_millis(50)).return_item(1);
        left.expect_next().after(Duration::from_millis(50)).return_item(2);
        let mut right = left.clone();
        let stats = left.stats();

        let (a, b) = tokio::join!(left.next(), right.next());
        let mut got = vec![a.unwrap(), b.unwrap()];
        got.sort_unstable();

        assert_eq!(got, vec![1, 2]);
        assert_eq!(stats.max_concurrent(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serialized_callers_never_overlap() {
        let mut source = MockSource::new();
        for i in 0..4 {
            source
                .expect_next()
                .after(Duration::from_millis(20))
                .return_item(i);
        }
        let stats = source.stats();
        let shared = Arc::new(AsyncMutex::new(source));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                tokio::spawn(async move { shared.lock().await.next().await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_some());
        }

        assert_eq!(stats.calls(), 4);
        assert_eq!(stats.max_concurrent(), 1);
        stats.verify();
    }

    #[test]
    fn test_shared_buffer_lines() {
        let mut buffer = SharedBuffer::new();
        writeln!(buffer, "one").unwrap();
        writeln!(buffer, "two").unwrap();
        assert_eq!(buffer.lines(), vec!["one", "two"]);
    }
}
