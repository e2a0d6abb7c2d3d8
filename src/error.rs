//! Unified error handling for the monitor
//!
//! Domain errors stay small and precise ([`FetchError`], [`CommitError`],
//! [`ConfigError`]); this module wraps them into a single [`Error`] so the
//! sync loop can log any failed cycle with its category.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bfbc2_monitor::error::{Error, MonitorErrorTrait};
//!
//! fn log_failure(err: &Error) {
//!     tracing::warn!(category = %err.category(), "Cycle failed: {err}");
//! }
//! ```

use std::fmt;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::utils::error::{CommitError, FetchError};

/// Common trait for all monitor error types
pub trait MonitorErrorTrait: std::error::Error {
    /// Get the error category for logging and handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Upstream server listing (HTTP, decoding)
    Upstream,
    /// Chat platform (gateway, REST)
    Platform,
    /// Configuration and validation errors
    Config,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upstream => "upstream",
            Self::Platform => "platform",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

impl MonitorErrorTrait for FetchError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Upstream
    }
}

impl MonitorErrorTrait for CommitError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Platform
    }
}

impl MonitorErrorTrait for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Config
    }
}

/// Unified error type for the monitor
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream listing errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Live message commit errors
    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl MonitorErrorTrait for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Commit(e) => e.category(),
            Self::Config(e) => e.category(),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
