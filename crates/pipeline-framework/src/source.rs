//! # Source Trait
//!
//! The `Source` trait is the contract for anything that hands out work items
//! one at a time: a timed feed in production, a scripted
//! [`MockSource`](crate::mock::MockSource) in tests.
//!
//! `next()` returns `Some(item)` while items remain and `None` once the source
//! is exhausted. `None` is the end-marker, not an error; a source that has
//! returned `None` keeps returning it.
//!
//! Sources take `&mut self`, so sharing one between several consumers means
//! putting it behind an async mutex. Whoever holds the guard is the only
//! caller of `next()` for as long as it holds it.

use async_trait::async_trait;

#[async_trait]
pub trait Source<T>: Send + 'static {
    /// Produces the next item, suspending until it is due, or `None` once the
    /// source is exhausted.
    async fn next(&mut self) -> Option<T>;

    /// Number of items not yet handed out, if the source knows it.
    fn remaining(&self) -> Option<usize> {
        None
    }
}
