//! # Framework Errors
//!
//! Common error types for the coordination primitives. Note that an empty
//! queue is never an error: a bounded [`pop_timeout`](crate::HandoffQueue::pop_timeout)
//! that elapses reports [`FrameworkError::Timeout`] so the caller can re-check
//! its terminal conditions and carry on.

use std::time::Duration;

/// Errors that can occur within the pipeline framework itself.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("No item within {0:?}")]
    Timeout(Duration),
    #[error("task_done called more times than items were pushed")]
    TaskDoneOverflow,
}

impl FrameworkError {
    /// True for the "nothing arrived in time" outcome of a bounded pop.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FrameworkError::Timeout(_))
    }
}
