//! Bucket stored in a durable local slot.

use async_trait::async_trait;
use parking_lot::Mutex;
use sift_cache::Cache;
use tracing::debug;

use crate::bucket::{BucketBackend, BucketItem, BucketVariant, Snapshot};
use crate::SiftError;

/// Slot holding the JSON-encoded item list.
pub const BUCKET_SLOT: &str = "bucket";

/// Offline backend: the cache slot is the source of truth.
///
/// Each mutation is a read-modify-overwrite of the whole slot, finished
/// before the call returns. Snapshots carry the number of writes made
/// through this backend, counted under the write lock.
pub struct DurableBucket {
    cache: Cache,
    revision: Mutex<u64>,
}

impl DurableBucket {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            revision: Mutex::new(0),
        }
    }

    fn read(&self) -> Result<Vec<BucketItem>, SiftError> {
        Ok(self
            .cache
            .get::<Vec<BucketItem>>(BUCKET_SLOT)?
            .unwrap_or_default())
    }

    fn write(&self, items: &[BucketItem]) -> Result<(), SiftError> {
        self.cache.set(BUCKET_SLOT, items)?;
        debug!(count = items.len(), "bucket persisted");
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut Vec<BucketItem>)) -> Result<Snapshot, SiftError> {
        let mut revision = self.revision.lock();
        let mut items = self.read()?;
        change(&mut items);
        self.write(&items)?;
        *revision += 1;
        Ok(Snapshot::at(*revision, items))
    }
}

#[async_trait]
impl BucketBackend for DurableBucket {
    fn variant(&self) -> BucketVariant {
        BucketVariant::Offline
    }

    async fn load(&self) -> Result<Snapshot, SiftError> {
        let revision = self.revision.lock();
        Ok(Snapshot::at(*revision, self.read()?))
    }

    async fn add(&self, item: &BucketItem) -> Result<Snapshot, SiftError> {
        self.update(|items| {
            if !items.contains(item) {
                items.push(item.clone());
            }
        })
    }

    async fn remove(&self, item: &BucketItem) -> Result<Snapshot, SiftError> {
        self.update(|items| items.retain(|existing| existing != item))
    }

    async fn clear(&self) -> Result<Snapshot, SiftError> {
        self.update(Vec::clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketManager;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();

        let manager = BucketManager::new(DurableBucket::new(Cache::open(dir.path()).unwrap()));
        manager.load().await.unwrap();
        manager.add(BucketItem::new("1", "docs")).await.unwrap();
        manager.add(BucketItem::new("2", "maps")).await.unwrap();
        let before: HashSet<BucketItem> = manager.items().into_iter().collect();
        drop(manager);

        let reloaded = BucketManager::new(DurableBucket::new(Cache::open(dir.path()).unwrap()));
        reloaded.load().await.unwrap();
        let after: HashSet<BucketItem> = reloaded.items().into_iter().collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_slot_format() {
        let cache = Cache::in_memory();
        let bucket = DurableBucket::new(cache.clone());
        bucket.add(&BucketItem::new("1", "docs")).await.unwrap();

        let raw: serde_json::Value = cache.get(BUCKET_SLOT).unwrap().unwrap();
        assert_eq!(raw, serde_json::json!([{"id": "1", "categoryId": "docs"}]));
    }

    #[tokio::test]
    async fn test_every_mutation_persists() {
        let cache = Cache::in_memory();
        let bucket = DurableBucket::new(cache.clone());
        bucket.add(&BucketItem::new("1", "docs")).await.unwrap();
        bucket.add(&BucketItem::new("2", "docs")).await.unwrap();
        bucket.remove(&BucketItem::new("1", "docs")).await.unwrap();

        let stored: Vec<BucketItem> = cache.get(BUCKET_SLOT).unwrap().unwrap();
        assert_eq!(stored, vec![BucketItem::new("2", "docs")]);

        bucket.clear().await.unwrap();
        let stored: Vec<BucketItem> = cache.get(BUCKET_SLOT).unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_missing_slot_is_empty() {
        let bucket = DurableBucket::new(Cache::in_memory());
        assert!(bucket.load().await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_revision_counts_writes() {
        let bucket = DurableBucket::new(Cache::in_memory());
        assert_eq!(bucket.load().await.unwrap().revision, Some(0));

        bucket.add(&BucketItem::new("1", "docs")).await.unwrap();
        let snapshot = bucket.remove(&BucketItem::new("1", "docs")).await.unwrap();
        assert_eq!(snapshot, Snapshot::at(2, Vec::new()));
    }
}
