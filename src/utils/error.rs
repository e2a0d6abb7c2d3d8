//! Error types for the status pipeline
//!
//! Upstream failures and chat-platform failures are kept apart because the
//! sync loop handles them differently: a missing message heals itself, while
//! everything else goes through the backoff path.

use thiserror::Error;

/// Errors that can occur while fetching the server listing
///
/// There is a single kind on purpose: the upstream API is flaky and every
/// failure is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network, HTTP or decoding failure
    #[error("Transient upstream failure: {reason}")]
    Transient { reason: String },
}

impl FetchError {
    /// Create a transient error from any displayable reason
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Upstream answered with a non-success status code
    pub fn status(code: u16, url: &str) -> Self {
        Self::transient(format!("HTTP {code} from {url}"))
    }

    /// Upstream payload could not be decoded
    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::transient(format!("Malformed upstream payload: {err}"))
    }

    /// Human readable reason
    pub fn reason(&self) -> &str {
        match self {
            Self::Transient { reason } => reason,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err)
        } else if err.is_timeout() {
            Self::transient(format!("Request timeout: {err}"))
        } else {
            Self::transient(format!("HTTP request failed: {err}"))
        }
    }
}

/// Errors reported by the chat platform when committing a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// The tracked message or its channel no longer exists
    #[error("Message or channel not found")]
    NotFound,

    /// The platform could not be reached or refused the request
    #[error("Chat platform unavailable: {reason}")]
    PlatformUnavailable { reason: String },
}

impl CommitError {
    /// Create an unavailable error from any displayable reason
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::PlatformUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether this error invalidates the tracked handle
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
