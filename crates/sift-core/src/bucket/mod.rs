//! Bucket module.
//!
//! Contains bucket item identity, the bucket state machine, and its
//! offline and remote backends.

mod item;
mod manager;
mod offline;
mod remote;

pub use item::{BucketItem, RemoteBucketEntry};
pub use manager::{BucketBackend, BucketManager, BucketOutcome, BucketVariant, Phase, Snapshot};
pub use offline::{DurableBucket, BUCKET_SLOT};
pub use remote::RemoteBucket;
