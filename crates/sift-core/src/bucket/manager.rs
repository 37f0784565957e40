//! The bucket state machine.

use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bucket::BucketItem;
use crate::sequence::{SequenceGuard, Ticket};
use crate::SiftError;

/// Lifecycle phase of a [`BucketManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Created, nothing loaded.
    Idle,
    /// Initial load in flight.
    Loading,
    /// Loaded; mutations allowed.
    Ready,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Result of a successful bucket mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOutcome {
    /// The item was appended.
    Added,
    /// An item with the same identity was already there; nothing changed.
    AlreadyPresent,
    /// The item was removed.
    Removed,
    /// The item was not in the bucket; nothing changed.
    NotPresent,
    /// The bucket was emptied.
    Cleared,
}

/// Where the authoritative bucket lives. One deployment uses one variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketVariant {
    /// A durable local slot.
    #[default]
    Offline,
    /// The server, through the bucket endpoints.
    Remote,
}

impl BucketVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketVariant::Offline => "offline",
            BucketVariant::Remote => "remote",
        }
    }
}

impl fmt::Display for BucketVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete bucket contents as a backend reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub items: Vec<BucketItem>,
    /// Write count taken inside the backend's critical section, for
    /// backends that order their own writes. A higher revision always
    /// holds newer contents.
    pub revision: Option<u64>,
}

impl Snapshot {
    /// Contents at a known write revision.
    pub fn at(revision: u64, items: Vec<BucketItem>) -> Self {
        Self {
            items,
            revision: Some(revision),
        }
    }
}

impl From<Vec<BucketItem>> for Snapshot {
    fn from(items: Vec<BucketItem>) -> Self {
        Self {
            items,
            revision: None,
        }
    }
}

/// Storage behind a [`BucketManager`].
///
/// Every operation returns the complete bucket contents after it was
/// applied, in order.
#[async_trait]
pub trait BucketBackend: Send + Sync {
    /// The variant this backend implements.
    fn variant(&self) -> BucketVariant;

    /// Read the current contents. A missing source is an empty bucket.
    async fn load(&self) -> Result<Snapshot, SiftError>;

    /// Append an item.
    async fn add(&self, item: &BucketItem) -> Result<Snapshot, SiftError>;

    /// Remove every item with the identity of `item`.
    async fn remove(&self, item: &BucketItem) -> Result<Snapshot, SiftError>;

    /// Remove everything.
    async fn clear(&self) -> Result<Snapshot, SiftError>;
}

#[derive(Debug)]
struct BucketState {
    phase: Phase,
    items: Vec<BucketItem>,
    revision: u64,
}

impl BucketState {
    fn require_ready(&self) -> Result<(), SiftError> {
        if self.phase == Phase::Ready {
            Ok(())
        } else {
            Err(SiftError::InvalidState {
                expected: Phase::Ready.to_string(),
                found: self.phase.to_string(),
            })
        }
    }
}

/// The bucket as the user sees it.
///
/// Memory only changes once the backend has answered. When mutations
/// overlap, a revisioned snapshot is applied only if it is not older than
/// the one in memory; otherwise only the response of the most recently
/// issued request is applied.
pub struct BucketManager {
    backend: Box<dyn BucketBackend>,
    state: Mutex<BucketState>,
    sequence: SequenceGuard,
}

impl BucketManager {
    /// Create an idle manager over a backend.
    pub fn new(backend: impl BucketBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            state: Mutex::new(BucketState {
                phase: Phase::Idle,
                items: Vec::new(),
                revision: 0,
            }),
            sequence: SequenceGuard::new(),
        }
    }

    /// The backend variant.
    pub fn variant(&self) -> BucketVariant {
        self.backend.variant()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Populate memory from the backend. Only valid once, from `Idle`.
    pub async fn load(&self) -> Result<usize, SiftError> {
        {
            let mut state = self.state.lock();
            if state.phase != Phase::Idle {
                return Err(SiftError::InvalidState {
                    expected: Phase::Idle.to_string(),
                    found: state.phase.to_string(),
                });
            }
            state.phase = Phase::Loading;
        }

        let ticket = self.sequence.issue();
        match self.backend.load().await {
            Ok(snapshot) => {
                self.apply(ticket, snapshot);
                let mut state = self.state.lock();
                state.phase = Phase::Ready;
                debug!(variant = %self.variant(), count = state.items.len(), "bucket loaded");
                Ok(state.items.len())
            }
            Err(e) => {
                self.state.lock().phase = Phase::Idle;
                Err(e)
            }
        }
    }

    /// Add an item unless one with the same identity is present.
    pub async fn add(&self, item: BucketItem) -> Result<BucketOutcome, SiftError> {
        {
            let state = self.state.lock();
            state.require_ready()?;
            if state.items.contains(&item) {
                return Ok(BucketOutcome::AlreadyPresent);
            }
        }

        let ticket = self.sequence.issue();
        let snapshot = self.backend.add(&item).await?;
        self.apply(ticket, snapshot);
        Ok(BucketOutcome::Added)
    }

    /// Remove the item with this identity, if present.
    pub async fn remove(&self, item: &BucketItem) -> Result<BucketOutcome, SiftError> {
        {
            let state = self.state.lock();
            state.require_ready()?;
            if !state.items.contains(item) {
                return Ok(BucketOutcome::NotPresent);
            }
        }

        let ticket = self.sequence.issue();
        let snapshot = self.backend.remove(item).await?;
        self.apply(ticket, snapshot);
        Ok(BucketOutcome::Removed)
    }

    /// Empty the bucket.
    pub async fn clear(&self) -> Result<BucketOutcome, SiftError> {
        self.state.lock().require_ready()?;

        let ticket = self.sequence.issue();
        let snapshot = self.backend.clear().await?;
        self.apply(ticket, snapshot);
        Ok(BucketOutcome::Cleared)
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Check if an item with this identity is present.
    pub fn contains(&self, item: &BucketItem) -> bool {
        self.state.lock().items.contains(item)
    }

    /// Snapshot of the items, in append order.
    pub fn items(&self) -> Vec<BucketItem> {
        self.state.lock().items.clone()
    }

    fn apply(&self, ticket: Ticket, snapshot: Snapshot) -> bool {
        let mut unique: Vec<BucketItem> = Vec::with_capacity(snapshot.items.len());
        for item in snapshot.items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }

        let mut state = self.state.lock();
        match snapshot.revision {
            Some(revision) if revision < state.revision => {
                debug!(revision, current = state.revision, "discarding older bucket snapshot");
                return false;
            }
            Some(revision) => state.revision = revision,
            None if !self.sequence.is_current(ticket) => {
                debug!(?ticket, "discarding superseded bucket response");
                return false;
            }
            None => {}
        }
        state.items = unique;
        true
    }
}

impl fmt::Debug for BucketManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BucketManager")
            .field("variant", &self.variant())
            .field("phase", &state.phase)
            .field("count", &state.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::DurableBucket;
    use sift_cache::Cache;
    use std::sync::Arc;
    use tokio::sync::{mpsc, oneshot};

    fn item(doc: &str, cat: &str) -> BucketItem {
        BucketItem::new(doc, cat)
    }

    async fn ready_manager() -> BucketManager {
        let manager = BucketManager::new(DurableBucket::new(Cache::in_memory()));
        manager.load().await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let manager = BucketManager::new(DurableBucket::new(Cache::in_memory()));
        assert_eq!(manager.phase(), Phase::Idle);

        let err = manager.add(item("1", "docs")).await.unwrap_err();
        assert!(matches!(err, SiftError::InvalidState { .. }));

        assert_eq!(manager.load().await.unwrap(), 0);
        assert_eq!(manager.phase(), Phase::Ready);
        assert!(manager.load().await.is_err());
        assert_eq!(manager.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let manager = ready_manager().await;
        let a = item("1", "docs");

        assert_eq!(manager.add(a.clone()).await.unwrap(), BucketOutcome::Added);
        assert_eq!(
            manager.add(a.clone()).await.unwrap(),
            BucketOutcome::AlreadyPresent
        );
        assert_eq!(manager.count(), 1);
    }

    #[tokio::test]
    async fn test_same_document_in_two_categories() {
        let manager = ready_manager().await;
        manager.add(item("1", "docs")).await.unwrap();
        manager.add(item("1", "maps")).await.unwrap();
        assert_eq!(manager.count(), 2);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let manager = ready_manager().await;
        manager.add(item("1", "docs")).await.unwrap();

        let outcome = manager.remove(&item("2", "docs")).await.unwrap();
        assert_eq!(outcome, BucketOutcome::NotPresent);
        assert_eq!(manager.items(), vec![item("1", "docs")]);
    }

    #[tokio::test]
    async fn test_add_add_remove() {
        let manager = ready_manager().await;
        let a = item("1", "docs");

        let outcomes = vec![
            manager.add(a.clone()).await.unwrap(),
            manager.add(a.clone()).await.unwrap(),
            manager.remove(&a).await.unwrap(),
        ];
        assert_eq!(
            outcomes,
            vec![
                BucketOutcome::Added,
                BucketOutcome::AlreadyPresent,
                BucketOutcome::Removed
            ]
        );
        assert_eq!(manager.count(), 0);
    }

    #[tokio::test]
    async fn test_append_order_and_clear() {
        let manager = ready_manager().await;
        manager.add(item("b", "docs")).await.unwrap();
        manager.add(item("a", "docs")).await.unwrap();
        assert_eq!(manager.items(), vec![item("b", "docs"), item("a", "docs")]);

        assert_eq!(manager.clear().await.unwrap(), BucketOutcome::Cleared);
        assert_eq!(manager.count(), 0);
    }

    /// Backend whose `add` answers are supplied by the test.
    struct GatedBackend {
        calls: mpsc::UnboundedSender<oneshot::Sender<Snapshot>>,
    }

    #[async_trait]
    impl BucketBackend for GatedBackend {
        fn variant(&self) -> BucketVariant {
            BucketVariant::Remote
        }

        async fn load(&self) -> Result<Snapshot, SiftError> {
            Ok(Snapshot::default())
        }

        async fn add(&self, _item: &BucketItem) -> Result<Snapshot, SiftError> {
            let (tx, rx) = oneshot::channel();
            self.calls
                .send(tx)
                .map_err(|e| SiftError::Network(e.to_string()))?;
            rx.await.map_err(|e| SiftError::Network(e.to_string()))
        }

        async fn remove(&self, _item: &BucketItem) -> Result<Snapshot, SiftError> {
            Ok(Snapshot::default())
        }

        async fn clear(&self) -> Result<Snapshot, SiftError> {
            Ok(Snapshot::default())
        }
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let (calls_tx, mut calls_rx) = mpsc::unbounded_channel();
        let manager = Arc::new(BucketManager::new(GatedBackend { calls: calls_tx }));
        manager.load().await.unwrap();

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.add(item("a", "docs")).await })
        };
        let first_reply = calls_rx.recv().await.unwrap();

        let second = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.add(item("b", "docs")).await })
        };
        let second_reply = calls_rx.recv().await.unwrap();

        // The later request answers first; the earlier answer arrives last.
        second_reply
            .send(vec![item("a", "docs"), item("b", "docs")].into())
            .unwrap();
        assert_eq!(second.await.unwrap().unwrap(), BucketOutcome::Added);

        first_reply.send(vec![item("a", "docs")].into()).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), BucketOutcome::Added);

        assert_eq!(manager.items(), vec![item("a", "docs"), item("b", "docs")]);
    }

    #[tokio::test]
    async fn test_newer_revision_wins_over_later_ticket() {
        let (calls_tx, mut calls_rx) = mpsc::unbounded_channel();
        let manager = Arc::new(BucketManager::new(GatedBackend { calls: calls_tx }));
        manager.load().await.unwrap();

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.add(item("a", "docs")).await })
        };
        let first_reply = calls_rx.recv().await.unwrap();

        let second = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.add(item("b", "docs")).await })
        };
        let second_reply = calls_rx.recv().await.unwrap();

        // The later request took the write lock first.
        second_reply.send(Snapshot::at(1, vec![item("b", "docs")])).unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(manager.items(), vec![item("b", "docs")]);

        first_reply
            .send(Snapshot::at(2, vec![item("b", "docs"), item("a", "docs")]))
            .unwrap();
        first.await.unwrap().unwrap();
        assert_eq!(manager.items(), vec![item("b", "docs"), item("a", "docs")]);

        // A stale revision never overwrites newer contents.
        assert!(!manager.apply(manager.sequence.issue(), Snapshot::at(1, Vec::new())));
        assert_eq!(manager.count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_offline_adds_match_slot() {
        let cache = Cache::in_memory();
        let manager = Arc::new(BucketManager::new(DurableBucket::new(cache.clone())));
        manager.load().await.unwrap();

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.add(item(&i.to_string(), "docs")).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), BucketOutcome::Added);
        }

        let stored: Vec<BucketItem> = cache.get(crate::bucket::BUCKET_SLOT).unwrap().unwrap();
        assert_eq!(stored.len(), 32);
        assert_eq!(manager.items(), stored);
    }
}
