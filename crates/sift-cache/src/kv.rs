//! Key-value slots with automatic JSON serialization.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::CacheError;

/// Raw byte storage behind a [`Cache`].
///
/// Every write replaces the whole slot. Implementations must make a write
/// either fully visible or not visible at all.
pub trait SlotStore: Send + Sync {
    /// Read a slot, `None` if it was never written or has been deleted.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Overwrite a slot.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;

    /// Delete a slot. Deleting a missing slot is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Directory-backed store: one `<key>.json` file per slot.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(self.slot_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::StoreError(e.to_string())),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let path = self.slot_path(key);
        let temp = self.dir.join(format!(".{}.json.tmp", key));

        // Write-then-rename keeps the slot whole even if we die mid-write.
        fs::write(&temp, bytes).map_err(|e| CacheError::StoreError(e.to_string()))?;
        fs::rename(&temp, &path).map_err(|e| CacheError::StoreError(e.to_string()))?;
        debug!(slot = key, bytes = bytes.len(), "slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::StoreError(e.to_string())),
        }
    }
}

/// In-memory store (for tests and ephemeral sessions).
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.slots.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

/// Type-safe cache over a [`SlotStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and clones share
/// the same underlying store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn SlotStore>,
}

impl Cache {
    /// Open a directory-backed cache.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open("/home/me/.local/share/sift")?;
    /// ```
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self::with_store(FileStore::open(dir)?))
    }

    /// Create a cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Wrap a custom store.
    pub fn with_store(store: impl SlotStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let items: Option<Vec<BucketItem>> = cache.get("bucket")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        validate_key(key)?;
        match self.store.read(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache, replacing the whole slot.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        validate_key(key)?;
        let bytes = serde_json::to_vec(value)?;
        self.store.write(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        validate_key(key)?;
        self.store.remove(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        validate_key(key)?;
        Ok(self.store.read(key)?.is_some())
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let cache = Cache::in_memory();
        cache.set("bucket", &vec!["a", "b"]).unwrap();

        let value: Option<Vec<String>> = cache.get("bucket").unwrap();
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_missing_key_is_none() {
        let cache = Cache::in_memory();
        let value: Option<String> = cache.get("token").unwrap();
        assert!(value.is_none());
        assert!(!cache.exists("token").unwrap());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let cache = Cache::in_memory();
        assert!(cache.delete("token").is_ok());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let cache = Cache::in_memory();
        assert!(matches!(
            cache.set("../escape", &1),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(cache.get::<i32>(""), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let cache = Cache::open(dir.path()).unwrap();
        cache.set("username", "alice").unwrap();
        drop(cache);

        let reopened = Cache::open(dir.path()).unwrap();
        let value: Option<String> = reopened.get("username").unwrap();
        assert_eq!(value.as_deref(), Some("alice"));
    }

    #[test]
    fn test_file_store_overwrite_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();

        cache.set("bucket", &vec![1, 2, 3]).unwrap();
        cache.set("bucket", &vec![4]).unwrap();

        let value: Option<Vec<i32>> = cache.get("bucket").unwrap();
        assert_eq!(value, Some(vec![4]));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bucket.json"), b"{not json").unwrap();

        let cache = Cache::open(dir.path()).unwrap();
        let result: Result<Option<Vec<i32>>, _> = cache.get("bucket");
        assert!(matches!(result, Err(CacheError::SerializeError(_))));
    }
}
