//! Error types for the service.

use crate::lifecycle::ServicePhase;
use pipeline_framework::FrameworkError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can end a run or stop it from starting.
///
/// Queue timeouts and an exhausted feed are not here: they are normal
/// control flow inside the workers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The order feed could not be read.
    #[error("Cannot read order feed {path}: {source}")]
    Feed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The journal file could not be created.
    #[error("Cannot create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The journal writer failed while the service was running.
    #[error("Journal write failed: {0}")]
    Journal(#[source] std::io::Error),

    /// The configuration file could not be read or parsed.
    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The configuration parsed but does not make sense.
    #[error("Config validation error: {0}")]
    Validation(String),

    /// The run was cancelled before it finished.
    #[error("Service cancelled during {0:?}")]
    Cancelled(ServicePhase),

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Framework(#[from] FrameworkError),
}

impl ServiceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled(_))
    }
}
