//! Durable local slots for sift.
//!
//! Provides a small, JSON-encoding key/value layer with single-slot
//! overwrite semantics, plus the session slots (token and username).
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_cache::Cache;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Item {
//!     id: String,
//! }
//!
//! let cache = Cache::open(data_dir)?;
//!
//! // Store a value
//! cache.set("bucket", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Vec<Item>> = cache.get("bucket")?;
//!
//! // Delete a value
//! cache.delete("bucket")?;
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::{Cache, FileStore, MemoryStore, SlotStore};
pub use session::{Credentials, SessionStore, TOKEN_KEY, USERNAME_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Credentials, SessionStore};
}
