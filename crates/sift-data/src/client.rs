//! reqwest-backed implementation of the sift collaborator traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use tracing::{debug, warn};

use sift_core::api::{
    AddToBucketRequest, BucketApi, ClearBucketRequest, DeleteFromBucketRequest, SearchApi,
    SearchRequest, SessionApi,
};
use sift_core::bucket::BucketItem;
use sift_core::search::SearchQuery;
use sift_core::ApiResponse;

use crate::FetchError;

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default timeout shared by every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root, e.g. `https://search.example.com/api`.
    pub base_url: String,
    /// Timeout for a whole request, including reading the body.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a config for a server root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP collaborator for [`AppState`](sift_core::AppState).
///
/// Every request goes through one normalization point: whatever happens,
/// the caller gets an [`ApiResponse`]. Failures are never retried.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{}: unsupported scheme",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Server root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an endpoint path such as `/search`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, context: &'static str, request: RequestBuilder) -> ApiResponse {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return network_failure(context, &e),
        };

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        match response.bytes().await {
            Ok(body) => {
                debug!(context, status = status.as_u16(), bytes = body.len(), "response");
                ApiResponse::new(status.as_u16(), status_text, body.to_vec())
            }
            Err(e) => network_failure(context, &e),
        }
    }
}

fn failure_code(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "TIMEOUT"
    } else if error.is_connect() {
        "CONNECTION_ERROR"
    } else {
        "NETWORK_ERROR"
    }
}

fn network_failure(context: &'static str, error: &reqwest::Error) -> ApiResponse {
    let code = failure_code(error);
    warn!(context, code, error = %error, "request failed");
    ApiResponse::network_failure(code)
}

#[async_trait]
impl SessionApi for HttpBackend {
    async fn authenticate(&self, login: &str, password: &str) -> ApiResponse {
        let request = self
            .client
            .get(self.endpoint("/auth"))
            .basic_auth(login, Some(password));
        self.send("auth", request).await
    }

    async fn check_session(&self, token: &str) -> ApiResponse {
        let request = self
            .client
            .get(self.endpoint("/session"))
            .query(&[("token", token)]);
        self.send("get_session", request).await
    }

    async fn delete_session(&self, token: &str) -> ApiResponse {
        let request = self
            .client
            .delete(self.endpoint("/session"))
            .query(&[("token", token)]);
        self.send("delete_session", request).await
    }
}

#[async_trait]
impl SearchApi for HttpBackend {
    async fn get_categories(&self, token: &str) -> ApiResponse {
        let request = self
            .client
            .get(self.endpoint("/categories"))
            .query(&[("token", token)]);
        self.send("get_categories", request).await
    }

    async fn search(&self, token: &str, query: &SearchQuery) -> ApiResponse {
        let request = self
            .client
            .post(self.endpoint("/search"))
            .json(&SearchRequest { query, token });
        self.send("search", request).await
    }
}

#[async_trait]
impl BucketApi for HttpBackend {
    async fn add_to_bucket(&self, token: &str, item: &BucketItem) -> ApiResponse {
        let request = self
            .client
            .post(self.endpoint("/add_to_bucket"))
            .json(&AddToBucketRequest::new(token, item));
        self.send("add_to_bucket", request).await
    }

    async fn get_bucket(&self, token: &str) -> ApiResponse {
        let request = self
            .client
            .get(self.endpoint("/get_bucket"))
            .query(&[("token", token)]);
        self.send("get_bucket", request).await
    }

    async fn delete_from_bucket(&self, token: &str, item_id: u64) -> ApiResponse {
        let request = self
            .client
            .post(self.endpoint("/delete_from_bucket"))
            .json(&DeleteFromBucketRequest { token, item_id });
        self.send("delete_from_bucket", request).await
    }

    async fn clear_bucket(&self, token: &str) -> ApiResponse {
        let request = self
            .client
            .post(self.endpoint("/clear_bucket"))
            .json(&ClearBucketRequest { token });
        self.send("clear_bucket", request).await
    }
}
