//! Collaborator seams: the remote operations the core depends on.
//!
//! Implementations never fail at the language level. Transport failures
//! come back as an [`ApiResponse`] with
//! [`NETWORK_ERROR_STATUS`](crate::NETWORK_ERROR_STATUS).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketItem;
use crate::ids::{CategoryId, DocumentId};
use crate::search::SearchQuery;
use crate::ApiResponse;

/// Session issuance and validation.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Exchange credentials for a token. `login` is `"{username}/{organization}"`.
    async fn authenticate(&self, login: &str, password: &str) -> ApiResponse;

    /// Check that a token is still valid.
    async fn check_session(&self, token: &str) -> ApiResponse;

    /// Invalidate a token server-side.
    async fn delete_session(&self, token: &str) -> ApiResponse;
}

/// Category schemas and search.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// `GET /categories`.
    async fn get_categories(&self, token: &str) -> ApiResponse;

    /// `POST /search`.
    async fn search(&self, token: &str, query: &SearchQuery) -> ApiResponse;
}

/// Server-side bucket storage.
#[async_trait]
pub trait BucketApi: Send + Sync {
    /// `POST /add_to_bucket`.
    async fn add_to_bucket(&self, token: &str, item: &BucketItem) -> ApiResponse;

    /// `GET /get_bucket`.
    async fn get_bucket(&self, token: &str) -> ApiResponse;

    /// `POST /delete_from_bucket`.
    async fn delete_from_bucket(&self, token: &str, item_id: u64) -> ApiResponse;

    /// `POST /clear_bucket`.
    async fn clear_bucket(&self, token: &str) -> ApiResponse;
}

/// Everything the application needs from the server.
pub trait Api: SessionApi + SearchApi + BucketApi {}

impl<T: SessionApi + SearchApi + BucketApi> Api for T {}

/// `GET /auth` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub username: String,
}

/// `POST /search` request body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    #[serde(flatten)]
    pub query: &'a SearchQuery,
    pub token: &'a str,
}

/// `POST /add_to_bucket` request body.
#[derive(Debug, Clone, Serialize)]
pub struct AddToBucketRequest<'a> {
    pub token: &'a str,
    pub document_id: &'a DocumentId,
    pub service_id: &'a CategoryId,
}

impl<'a> AddToBucketRequest<'a> {
    pub fn new(token: &'a str, item: &'a BucketItem) -> Self {
        Self {
            token,
            document_id: &item.document_id,
            service_id: &item.category_id,
        }
    }
}

/// `POST /delete_from_bucket` request body.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFromBucketRequest<'a> {
    pub token: &'a str,
    pub item_id: u64,
}

/// `POST /clear_bucket` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ClearBucketRequest<'a> {
    pub token: &'a str,
}
