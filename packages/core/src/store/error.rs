//! Remote store error types.

use thiserror::Error;

/// Errors surfaced by the remote table gateway.
///
/// Backend error text is carried unmodified so callers can show it to the
/// user exactly as the backend produced it.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Network-level failure before any response arrived
    #[error("network error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The response body could not be decoded into the expected shape
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl StoreError {
    /// Create a backend error carrying the backend's own message text.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
