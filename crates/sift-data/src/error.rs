//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur while setting up the HTTP backend.
///
/// Request failures are not errors here: they come back as an
/// [`ApiResponse`](sift_core::ApiResponse) with status `0`.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The underlying client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}
