//! Errors for the queue service and its client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Queue is disabled, nothing to do.")]
    QueueDisabled,

    #[error("Error dialing {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
