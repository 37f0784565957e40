//! Bucket stored on the server.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use parking_lot::Mutex;
use tracing::debug;

use crate::api::BucketApi;
use crate::bucket::{BucketBackend, BucketItem, BucketVariant, RemoteBucketEntry, Snapshot};
use crate::SiftError;

/// Remote backend: every operation is a request, followed by a fresh
/// listing so memory mirrors what the server holds.
///
/// Concurrent writers are last-write-wins on the server.
pub struct RemoteBucket {
    api: Arc<dyn BucketApi>,
    token: String,
    /// Server ids per item identity, from the last listing.
    index: Mutex<HashMap<BucketItem, Vec<u64>>>,
}

impl RemoteBucket {
    pub fn new(api: Arc<dyn BucketApi>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
            index: Mutex::new(HashMap::new()),
        }
    }

    async fn fetch(&self) -> Result<Vec<BucketItem>, SiftError> {
        let entries: Vec<RemoteBucketEntry> =
            self.api.get_bucket(&self.token).await.into_result()?.json()?;

        let mut index: HashMap<BucketItem, Vec<u64>> = HashMap::new();
        let mut items = Vec::with_capacity(entries.len());
        for entry in &entries {
            let item = BucketItem::from(entry);
            let ids = index.entry(item.clone()).or_default();
            if ids.is_empty() {
                items.push(item);
            }
            ids.push(entry.id);
        }
        debug!(count = items.len(), "remote bucket listed");
        *self.index.lock() = index;
        Ok(items)
    }

    fn server_ids(&self, item: &BucketItem) -> Vec<u64> {
        self.index.lock().get(item).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl BucketBackend for RemoteBucket {
    fn variant(&self) -> BucketVariant {
        BucketVariant::Remote
    }

    async fn load(&self) -> Result<Snapshot, SiftError> {
        self.fetch().await.map(Snapshot::from)
    }

    async fn add(&self, item: &BucketItem) -> Result<Snapshot, SiftError> {
        self.api
            .add_to_bucket(&self.token, item)
            .await
            .into_result()?;
        self.fetch().await.map(Snapshot::from)
    }

    async fn remove(&self, item: &BucketItem) -> Result<Snapshot, SiftError> {
        let mut ids = self.server_ids(item);
        if ids.is_empty() {
            let items = self.fetch().await?;
            ids = self.server_ids(item);
            if ids.is_empty() {
                return Ok(items.into());
            }
        }

        try_join_all(ids.into_iter().map(|id| async move {
            self.api
                .delete_from_bucket(&self.token, id)
                .await
                .into_result()
        }))
        .await?;
        self.fetch().await.map(Snapshot::from)
    }

    async fn clear(&self) -> Result<Snapshot, SiftError> {
        self.api.clear_bucket(&self.token).await.into_result()?;
        self.index.lock().clear();
        Ok(Snapshot::default())
    }
}
