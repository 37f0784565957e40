//! Session persistence: the token and username slots.

use serde::{Deserialize, Serialize};

use crate::{Cache, CacheError};

/// Slot holding the session token.
pub const TOKEN_KEY: &str = "token";

/// Slot holding the username the token was issued to.
pub const USERNAME_KEY: &str = "username";

/// A persisted login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Session token issued by the server.
    pub token: String,
    /// Display name of the logged-in user.
    pub username: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }
}

/// Reads and writes [`Credentials`] through two fixed cache slots.
///
/// Absence of either slot means logged out.
///
/// # Example
///
/// ```rust,ignore
/// use sift_cache::{Cache, Credentials, SessionStore};
///
/// let store = SessionStore::new(Cache::open(data_dir)?);
/// store.save(&Credentials::new("tok-1", "alice"))?;
///
/// if let Some(creds) = store.load()? {
///     println!("logged in as {}", creds.username);
/// }
///
/// store.clear()?;
/// ```
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache,
}

impl SessionStore {
    /// Create a session store on top of a cache.
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Load the persisted login, if both slots are present.
    pub fn load(&self) -> Result<Option<Credentials>, CacheError> {
        let token: Option<String> = self.cache.get(TOKEN_KEY)?;
        let username: Option<String> = self.cache.get(USERNAME_KEY)?;
        Ok(match (token, username) {
            (Some(token), Some(username)) => Some(Credentials { token, username }),
            _ => None,
        })
    }

    /// Persist a login, replacing any previous one.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CacheError> {
        self.cache.set(TOKEN_KEY, &credentials.token)?;
        self.cache.set(USERNAME_KEY, &credentials.username)
    }

    /// Remove both slots.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(TOKEN_KEY)?;
        self.cache.delete(USERNAME_KEY)
    }
}
