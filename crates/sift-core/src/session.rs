//! Session lifecycle: restore, login, logout.

use std::sync::Arc;

use parking_lot::Mutex;
use sift_cache::{Credentials, SessionStore};
use tracing::{debug, warn};

use crate::api::{AuthResponse, SessionApi};
use crate::SiftError;

/// Organization used when none is given.
pub const DEFAULT_ORGANIZATION: &str = "default";

/// Result of restoring a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The stored token is still valid.
    Authenticated(Credentials),
    /// The server rejected the stored token; it has been forgotten.
    Expired,
    /// Nothing was stored.
    LoggedOut,
}

/// Owns the current login and its persisted copy.
pub struct SessionManager {
    api: Arc<dyn SessionApi>,
    store: SessionStore,
    current: Mutex<Option<Credentials>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn SessionApi>, store: SessionStore) -> Self {
        Self {
            api,
            store,
            current: Mutex::new(None),
        }
    }

    /// Validate the persisted login, if any.
    ///
    /// A 401 clears the stored token and username.
    pub async fn restore(&self) -> Result<SessionStatus, SiftError> {
        let Some(credentials) = self.store.load()? else {
            debug!("no stored session");
            return Ok(SessionStatus::LoggedOut);
        };

        match self.api.check_session(&credentials.token).await.into_result() {
            Ok(_) => {
                debug!(username = %credentials.username, "session restored");
                *self.current.lock() = Some(credentials.clone());
                Ok(SessionStatus::Authenticated(credentials))
            }
            Err(SiftError::Unauthorized) => {
                debug!("stored session expired");
                self.invalidate()?;
                Ok(SessionStatus::Expired)
            }
            Err(e) => Err(e),
        }
    }

    /// Log in as `username` within `organization`.
    ///
    /// With `remember` the login is persisted, otherwise any persisted
    /// login is removed.
    pub async fn login(
        &self,
        username: &str,
        organization: &str,
        password: &str,
        remember: bool,
    ) -> Result<Credentials, SiftError> {
        let login = format!("{}/{}", username, organization);
        let auth: AuthResponse = match self.api.authenticate(&login, password).await.into_result()
        {
            Ok(response) => response.json()?,
            Err(SiftError::Unauthorized) => return Err(SiftError::InvalidCredentials),
            Err(e) => return Err(e),
        };
        if auth.token.is_empty() {
            return Err(SiftError::Decode("empty session token".to_string()));
        }

        let display_name = if auth.username.is_empty() {
            username.to_string()
        } else {
            auth.username
        };
        let credentials = Credentials::new(auth.token, display_name);
        if remember {
            self.store.save(&credentials)?;
        } else {
            self.store.clear()?;
        }
        debug!(username = %credentials.username, remember, "logged in");
        *self.current.lock() = Some(credentials.clone());
        Ok(credentials)
    }

    /// End the session on the server and forget it locally.
    ///
    /// The server's answer is not checked; local state is cleared either way.
    pub async fn logout(&self) -> Result<(), SiftError> {
        let credentials = match self.current.lock().take() {
            Some(credentials) => Some(credentials),
            None => self.store.load()?,
        };
        if let Some(credentials) = credentials {
            let response = self.api.delete_session(&credentials.token).await;
            if !response.is_success() {
                warn!(status = response.status, "session delete failed");
            }
        }
        self.store.clear()?;
        Ok(())
    }

    /// Forget the session locally without contacting the server.
    pub fn invalidate(&self) -> Result<(), SiftError> {
        *self.current.lock() = None;
        self.store.clear()?;
        Ok(())
    }

    /// The active login.
    pub fn credentials(&self) -> Option<Credentials> {
        self.current.lock().clone()
    }

    /// The active token.
    pub fn token(&self) -> Option<String> {
        self.current.lock().as_ref().map(|c| c.token.clone())
    }

    /// The active token, or [`SiftError::LoggedOut`].
    pub fn require_token(&self) -> Result<String, SiftError> {
        self.token().ok_or(SiftError::LoggedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use sift_cache::Cache;

    struct FakeSessions {
        auth_status: u16,
        check_status: u16,
        deleted: Mutex<Vec<String>>,
        logins: Mutex<Vec<String>>,
    }

    impl FakeSessions {
        fn new(auth_status: u16, check_status: u16) -> Arc<Self> {
            Arc::new(Self {
                auth_status,
                check_status,
                deleted: Mutex::new(Vec::new()),
                logins: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SessionApi for FakeSessions {
        async fn authenticate(&self, login: &str, _password: &str) -> ApiResponse {
            self.logins.lock().push(login.to_string());
            if self.auth_status == 200 {
                ApiResponse::from_json(200, &json!({"token": "tok-1", "username": "Alice"}))
            } else {
                ApiResponse::new(self.auth_status, "", Vec::new())
            }
        }

        async fn check_session(&self, _token: &str) -> ApiResponse {
            ApiResponse::new(self.check_status, "", Vec::new())
        }

        async fn delete_session(&self, token: &str) -> ApiResponse {
            self.deleted.lock().push(token.to_string());
            ApiResponse::network_failure("NETWORK_ERROR")
        }
    }

    fn store_with_login(cache: &Cache) -> SessionStore {
        let store = SessionStore::new(cache.clone());
        store.save(&Credentials::new("tok-0", "alice")).unwrap();
        store
    }

    #[tokio::test]
    async fn test_restore_valid_session() {
        let cache = Cache::in_memory();
        let manager = SessionManager::new(FakeSessions::new(200, 200), store_with_login(&cache));

        let status = manager.restore().await.unwrap();
        assert_eq!(
            status,
            SessionStatus::Authenticated(Credentials::new("tok-0", "alice"))
        );
        assert_eq!(manager.token().as_deref(), Some("tok-0"));
    }

    #[tokio::test]
    async fn test_restore_expired_clears_store() {
        let cache = Cache::in_memory();
        let manager = SessionManager::new(FakeSessions::new(200, 401), store_with_login(&cache));

        assert_eq!(manager.restore().await.unwrap(), SessionStatus::Expired);
        assert!(!cache.exists(sift_cache::TOKEN_KEY).unwrap());
        assert!(!cache.exists(sift_cache::USERNAME_KEY).unwrap());
        assert!(manager.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_server_error_keeps_store() {
        let cache = Cache::in_memory();
        let manager = SessionManager::new(FakeSessions::new(200, 503), store_with_login(&cache));

        assert!(matches!(
            manager.restore().await,
            Err(SiftError::Server { status: 503 })
        ));
        assert!(cache.exists(sift_cache::TOKEN_KEY).unwrap());
    }

    #[tokio::test]
    async fn test_restore_without_username_is_logged_out() {
        let cache = Cache::in_memory();
        cache.set(sift_cache::TOKEN_KEY, "tok-0").unwrap();
        let manager = SessionManager::new(
            FakeSessions::new(200, 200),
            SessionStore::new(cache.clone()),
        );
        assert_eq!(manager.restore().await.unwrap(), SessionStatus::LoggedOut);
    }

    #[tokio::test]
    async fn test_login_remembers() {
        let cache = Cache::in_memory();
        let api = FakeSessions::new(200, 200);
        let manager = SessionManager::new(api.clone(), SessionStore::new(cache.clone()));

        let credentials = manager.login("alice", "acme", "secret", true).await.unwrap();
        assert_eq!(credentials, Credentials::new("tok-1", "Alice"));
        assert_eq!(*api.logins.lock(), vec!["alice/acme".to_string()]);

        let stored = SessionStore::new(cache).load().unwrap();
        assert_eq!(stored, Some(credentials));
    }

    #[tokio::test]
    async fn test_login_without_remember_clears_store() {
        let cache = Cache::in_memory();
        let manager = SessionManager::new(FakeSessions::new(200, 200), store_with_login(&cache));

        manager
            .login("alice", DEFAULT_ORGANIZATION, "secret", false)
            .await
            .unwrap();
        assert!(SessionStore::new(cache).load().unwrap().is_none());
        assert_eq!(manager.token().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let manager = SessionManager::new(
            FakeSessions::new(401, 200),
            SessionStore::new(Cache::in_memory()),
        );
        let err = manager.login("alice", "acme", "bad", true).await.unwrap_err();
        assert!(matches!(err, SiftError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_logout_uses_stored_token() {
        let cache = Cache::in_memory();
        let api = FakeSessions::new(200, 200);
        let manager = SessionManager::new(api.clone(), store_with_login(&cache));

        manager.logout().await.unwrap();
        assert_eq!(*api.deleted.lock(), vec!["tok-0".to_string()]);
        assert!(SessionStore::new(cache).load().unwrap().is_none());
        assert!(matches!(manager.require_token(), Err(SiftError::LoggedOut)));
    }
}
