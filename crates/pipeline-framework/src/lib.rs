//! # Pipeline Framework
//!
//! Building blocks for pipelines of cooperating async workers that pass work
//! through shared queues, under explicit locks and lifecycle signals.
//!
//! ## Why a separate crate?
//!
//! The coordination pieces (hand-off queues, one-way signals, status flags,
//! the log side-channel) know nothing about what flows through them. Keeping
//! them here means the service crate only contains the service: who takes
//! orders, who prepares them, who delivers them, and in which order things
//! shut down.
//!
//! ## Core Abstractions
//!
//! | Item | Role |
//! |------|------|
//! | [`HandoffQueue`] | Unbounded FIFO; `push` never waits, `pop` waits, `pop_timeout` gives up |
//! | [`Latch`] | One-way signal, set once, observed by many |
//! | [`BusyFlag`] / [`BusyBoard`] | Per-worker status cells and the "all idle?" query over them |
//! | [`Source`] | Async trait for anything that hands out items one at a time |
//! | [`Journal`] / [`EventLog`] / [`JournalWriter`] | Non-blocking log side-channel and the task that owns the log file |
//!
//! ## Concurrency Model
//!
//! Everything here is written for cooperative tasks on a Tokio runtime. Locks
//! inside the primitives are synchronous and never held across an `.await`.
//! Anything that must be held across an `.await` (for example, exclusive
//! access to a [`Source`]) belongs in a `tokio::sync::Mutex` owned by the
//! caller.
//!
//! A timeout is never a failure. [`HandoffQueue::pop_timeout`] returning
//! [`FrameworkError::Timeout`] is the caller's cue to re-check whether it
//! should stop.
//!
//! ```rust
//! use pipeline_framework::{HandoffQueue, Latch};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = HandoffQueue::new();
//!     let done = Latch::new();
//!
//!     let consumer = {
//!         let (queue, done) = (queue.clone(), done.clone());
//!         tokio::spawn(async move {
//!             let mut seen = Vec::new();
//!             loop {
//!                 match queue.pop_timeout(Duration::from_millis(20)).await {
//!                     Ok(item) => seen.push(item),
//!                     Err(_) if done.is_set() && queue.is_empty() => break,
//!                     Err(_) => continue,
//!                 }
//!             }
//!             seen
//!         })
//!     };
//!
//!     queue.push("espresso");
//!     queue.push("latte");
//!     done.set();
//!
//!     assert_eq!(consumer.await.unwrap(), vec!["espresso", "latte"]);
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module has a scripted [`MockSource`](mock::MockSource) and an
//! in-memory [`SharedBuffer`](mock::SharedBuffer) sink for the journal.

pub mod busy;
pub mod error;
pub mod journal;
pub mod latch;
pub mod mock;
pub mod queue;
pub mod source;
pub mod tracing;

// Re-export core types for convenience
pub use busy::{BusyBoard, BusyFlag};
pub use error::FrameworkError;
pub use journal::{EventLog, Journal, JournalWriter};
pub use latch::Latch;
pub use queue::HandoffQueue;
pub use source::Source;
