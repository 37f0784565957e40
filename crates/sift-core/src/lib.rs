//! Faceted search and bucket state for sift.
//!
//! This crate holds everything between the front end and the server:
//!
//! - **Catalog**: category schemas and the category selection
//! - **Search**: per-category filter values, query composition, result records
//! - **Bucket**: staged documents, stored offline or on the server
//! - **Session**: login, restore and logout over the durable token slots
//! - **App**: [`AppState`], the single owner of all of the above
//!
//! The server is reached only through the [`api`] traits, so any transport
//! can be plugged in.
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_core::prelude::*;
//!
//! let app = AppState::new(Arc::new(http), Cache::open(dir)?, BucketVariant::Offline);
//! if app.start().await? == View::Authentication {
//!     app.login("alice", "default", &password, true).await?;
//! }
//!
//! app.select_category("docs")?;
//! app.set_filter("docs", "lang", json!(["en"]))?;
//! if let Some(SearchOutcome::Matches(records)) = app.search("report").await? {
//!     app.add_to_bucket(BucketItem::from(&records[0])).await?;
//! }
//! ```

pub mod api;
pub mod app;
pub mod bucket;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod notice;
pub mod search;
pub mod sequence;
pub mod session;
pub mod transport;

pub use app::{AppState, View};
pub use error::SiftError;
pub use ids::*;
pub use transport::{ApiResponse, NETWORK_ERROR_STATUS};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::SiftError;
    pub use crate::ids::*;
    pub use crate::transport::ApiResponse;

    // Collaborators
    pub use crate::api::{Api, BucketApi, SearchApi, SessionApi};

    // Catalog
    pub use crate::catalog::{
        Category, CategorySchemaStore, CategorySelection, CheckAllState, FilterKind, FilterSchema,
    };

    // Search
    pub use crate::search::{
        compose, on_result, FilterState, FilterStateEngine, FilterValue, ResolvedFilter,
        ResultRecord, SearchOutcome, SearchQuery,
    };

    // Bucket
    pub use crate::bucket::{BucketItem, BucketManager, BucketOutcome, BucketVariant, Phase};

    // Session and app
    pub use crate::app::{AppState, View};
    pub use crate::notice::{Notice, NoticeLevel};
    pub use crate::session::{SessionManager, SessionStatus, DEFAULT_ORGANIZATION};
    pub use sift_cache::{Cache, Credentials};
}
