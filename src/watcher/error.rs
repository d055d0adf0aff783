//! Error types for watch sessions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from setting up or running a watch session.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Cannot resolve {path}: {reason}")]
    Resolve { path: String, reason: String },

    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch directory {}: {reason}", .path.display())]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("File system event error: {details}")]
    EventError { details: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
