//! Bucket item identity.

use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, DocumentId};
use crate::search::ResultRecord;

/// A document staged in the bucket.
///
/// Identity is the `(document, category)` pair: the same document id may
/// exist in several categories. Stored locally as `{"id", "categoryId"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketItem {
    /// Document identifier.
    #[serde(rename = "id")]
    pub document_id: DocumentId,
    /// Category the document was found in.
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
}

impl BucketItem {
    pub fn new(document_id: impl Into<DocumentId>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            document_id: document_id.into(),
            category_id: category_id.into(),
        }
    }

    /// The bucket identity of a search result.
    pub fn from_record(record: &ResultRecord) -> Self {
        Self {
            document_id: record.document_id.clone(),
            category_id: record.category_id.clone(),
        }
    }
}

impl From<&ResultRecord> for BucketItem {
    fn from(record: &ResultRecord) -> Self {
        Self::from_record(record)
    }
}

/// An entry of `GET /get_bucket`.
///
/// `id` is assigned by the server and only used to delete the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBucketEntry {
    pub id: u64,
    pub document_id: DocumentId,
    /// The category, under the server's name for it.
    pub service_id: CategoryId,
}

impl From<&RemoteBucketEntry> for BucketItem {
    fn from(entry: &RemoteBucketEntry) -> Self {
        Self {
            document_id: entry.document_id.clone(),
            category_id: entry.service_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_wire_shape() {
        let item = BucketItem::new("doc-1", "docs");
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"id": "doc-1", "categoryId": "docs"})
        );
    }

    #[test]
    fn test_identity_includes_category() {
        assert_ne!(BucketItem::new("1", "docs"), BucketItem::new("1", "maps"));
        assert_eq!(BucketItem::new("1", "docs"), BucketItem::new("1", "docs"));
    }

    #[test]
    fn test_remote_entry_maps_to_item() {
        let entry: RemoteBucketEntry =
            serde_json::from_value(json!({"id": 7, "document_id": "doc-1", "service_id": "docs"}))
                .unwrap();
        assert_eq!(BucketItem::from(&entry), BucketItem::new("doc-1", "docs"));
    }
}
