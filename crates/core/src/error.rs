//! Error types for corral
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Malformed range queries are deliberately NOT an error kind: a score
//! range with `min > max` (or a NaN bound) degrades to an empty result,
//! matching the permissive range semantics of the wrapped store.

use thiserror::Error;

/// Result type alias for corral operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for remote collection operations
#[derive(Debug, Error)]
pub enum Error {
    /// Connection to the remote store could not be established or was
    /// lost mid-call. Not retried by this layer; surfaced to the caller.
    #[error("store unavailable: {reason}")]
    StoreUnavailable {
        /// Human-readable description of the connection failure
        reason: String,
    },

    /// An element payload could not be encoded or decoded. Aborts the
    /// enclosing operation immediately.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Construct a `StoreUnavailable` error from any displayable reason
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// True if this error came from the store connection rather than a codec
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable { .. })
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
