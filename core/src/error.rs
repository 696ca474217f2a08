//! Error types for the public IP address client.
//!
//! # Design
//! The first three variants are raised locally before anything reaches the
//! agent: `InvalidInput` for a missing argument, `InvalidConfiguration` for a
//! structurally incomplete record, and `NotFound` when a delete target does
//! not exist. Everything the agent or the wire reports back lands in one of
//! the remote variants; callers that only care whether the failure happened
//! on the far side can use [`ApiError::is_remote`].

use thiserror::Error;

/// Errors returned by `PublicIpAddressClient` and the conversion helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required argument was absent or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record is missing fields the operation needs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested public IP address does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The agent reported a failure in its reply (precheck rejections and
    /// malformed replies).
    #[error("remote error: {0}")]
    Remote(String),

    /// The agent answered with a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never completed (connection refused, reset, DNS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The caller's deadline expired before or during the call.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The reply body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Returns `true` for failures that originated on or on the way to the
    /// agent rather than in local validation.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ApiError::Remote(_) | ApiError::HttpError { .. } | ApiError::Transport(_)
        )
    }

    /// Prefix the message of a locally raised error with `context`.
    pub(crate) fn context(self, context: &str) -> Self {
        match self {
            ApiError::InvalidInput(msg) => ApiError::InvalidInput(format!("{context}: {msg}")),
            ApiError::InvalidConfiguration(msg) => {
                ApiError::InvalidConfiguration(format!("{context}: {msg}"))
            }
            other => other,
        }
    }
}
