//! HTTP transport for sift.
//!
//! Implements the [`sift_core::api`] traits over `reqwest`, with a single
//! shared timeout and no retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_data::{ClientConfig, HttpBackend};
//! use std::time::Duration;
//!
//! let http = HttpBackend::new(
//!     ClientConfig::new("https://search.example.com").with_timeout(Duration::from_secs(10)),
//! )?;
//!
//! let response = http.get_categories(&token).await;
//! if response.is_network_error() {
//!     eprintln!("no answer: {}", response.status_text);
//! }
//! ```

mod client;
mod error;

pub use client::{ClientConfig, HttpBackend, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::FetchError;
