//! Sift error types.

use thiserror::Error;

/// Errors surfaced to callers of the core.
///
/// Transport outcomes are mapped here exactly once, by
/// [`ApiResponse::into_result`](crate::ApiResponse::into_result).
#[derive(Error, Debug)]
pub enum SiftError {
    /// No response was received (timeout, refused connection, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The server rejected the session token (HTTP 401).
    #[error("Session is no longer valid")]
    Unauthorized,

    /// The server failed (HTTP 5xx).
    #[error("Server error: HTTP {status}")]
    Server { status: u16 },

    /// Any other non-success status.
    #[error("Unexpected response: HTTP {status} {text}")]
    UnexpectedStatus { status: u16, text: String },

    /// Login was refused.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The operation needs a session and there is none.
    #[error("Not logged in")]
    LoggedOut,

    /// A success response carried a body we could not read.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Filter not found in a category.
    #[error("Filter not found: {category}.{filter}")]
    FilterNotFound { category: String, filter: String },

    /// An operation was attempted in the wrong lifecycle phase.
    #[error("Invalid state: expected {expected}, found {found}")]
    InvalidState { expected: String, found: String },

    /// Cache error.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SiftError {
    /// Check if this error must invalidate the local session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SiftError::Unauthorized)
    }

    /// Check if no response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, SiftError::Network(_))
    }
}

impl From<sift_cache::CacheError> for SiftError {
    fn from(e: sift_cache::CacheError) -> Self {
        SiftError::CacheError(e.to_string())
    }
}

impl From<serde_json::Error> for SiftError {
    fn from(e: serde_json::Error) -> Self {
        SiftError::SerializationError(e.to_string())
    }
}
