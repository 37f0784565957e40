//! Opaque string identifiers issued by the search service.
//!
//! Each kind gets its own type so a document id cannot be passed where a
//! category id is expected. All of them borrow as `str`, so maps keyed by
//! an id can be queried with a plain `&str`.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Key of a category in the `/categories` listing.
    CategoryId
);
define_id!(
    /// Key of a filter inside one category's schema.
    FilterId
);
define_id!(
    /// Key of a document inside one category's search results.
    DocumentId
);

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_id_creation() {
        let id = CategoryId::new("docs");
        assert_eq!(id.as_str(), "docs");
        assert_eq!(id.to_string(), "docs");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = DocumentId::new("doc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""doc-1""#);
        let back: DocumentId = serde_json::from_str(r#""doc-1""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_as_map_key_lookup_by_str() {
        let mut map: IndexMap<CategoryId, u32> = IndexMap::new();
        map.insert("docs".into(), 1);
        assert_eq!(map.get("docs"), Some(&1));
    }
}
