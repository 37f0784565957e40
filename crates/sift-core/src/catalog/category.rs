//! Category definitions and their filter schemas.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::debug;

use crate::ids::{CategoryId, FilterId};
use crate::{ApiResponse, SiftError};

/// The type tag of a filter schema.
///
/// Tags the server sends that we do not know are kept verbatim as
/// `Unsupported` so that they stay inert instead of failing the whole
/// category load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterKind {
    /// A set of keys picked from `values`.
    Term,
    /// A numeric `[min, max]` interval.
    Range,
    /// A `[start, end]` date interval.
    DateRange,
    /// A `(lat1, lon1, lat2, lon2)` box.
    GeoBoundingBox,
    /// A `(lat, lon, meters)` circle.
    GeoDistance,
    /// Matched against the free-text field; holds no value of its own.
    FullText,
    /// Anything else.
    Unsupported(String),
}

impl FilterKind {
    /// Wire name of the type.
    pub fn as_str(&self) -> &str {
        match self {
            FilterKind::Term => "term",
            FilterKind::Range => "range",
            FilterKind::DateRange => "date_range",
            FilterKind::GeoBoundingBox => "geo_bounding_box",
            FilterKind::GeoDistance => "geo_distance",
            FilterKind::FullText => "full_text",
            FilterKind::Unsupported(other) => other,
        }
    }
}

impl From<String> for FilterKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "term" => FilterKind::Term,
            "range" => FilterKind::Range,
            "date_range" => FilterKind::DateRange,
            "geo_bounding_box" => FilterKind::GeoBoundingBox,
            "geo_distance" => FilterKind::GeoDistance,
            "full_text" => FilterKind::FullText,
            _ => FilterKind::Unsupported(s),
        }
    }
}

impl From<FilterKind> for String {
    fn from(kind: FilterKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema of one filter inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSchema {
    /// Filter type.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Human-readable label.
    #[serde(default)]
    pub description: String,
    /// Document fields the filter applies to.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Term filters: selectable key -> label.
    #[serde(default)]
    pub values: IndexMap<String, String>,
    /// Range filters: advisory lower bound.
    #[serde(default)]
    pub min: Option<Number>,
    /// Range filters: advisory upper bound.
    #[serde(default)]
    pub max: Option<Number>,
}

impl FilterSchema {
    /// Create a schema of the given type with no bounds or values.
    pub fn new(kind: FilterKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            fields: Vec::new(),
            values: IndexMap::new(),
            min: None,
            max: None,
        }
    }

    /// Create a term schema from `(key, label)` pairs.
    pub fn term<K, L>(description: impl Into<String>, values: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        let mut schema = Self::new(FilterKind::Term, description);
        schema.values = values
            .into_iter()
            .map(|(k, l)| (k.into(), l.into()))
            .collect();
        schema
    }

    /// Create a range schema with advisory bounds.
    pub fn range(
        description: impl Into<String>,
        min: impl Into<Number>,
        max: impl Into<Number>,
    ) -> Self {
        let mut schema = Self::new(FilterKind::Range, description);
        schema.min = Some(min.into());
        schema.max = Some(max.into());
        schema
    }
}

/// A partition of the searchable corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier (the key it was delivered under).
    #[serde(skip)]
    pub id: CategoryId,
    /// Display title.
    pub title: String,
    /// Category description.
    #[serde(default)]
    pub description: String,
    /// Filters, in server order.
    #[serde(default)]
    pub filters: IndexMap<FilterId, FilterSchema>,
}

impl Category {
    /// Create an empty category.
    pub fn new(id: impl Into<CategoryId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            filters: IndexMap::new(),
        }
    }

    /// Add a filter schema.
    pub fn with_filter(mut self, id: impl Into<FilterId>, schema: FilterSchema) -> Self {
        self.filters.insert(id.into(), schema);
        self
    }

    /// Look up a filter schema.
    pub fn filter(&self, id: &str) -> Option<&FilterSchema> {
        self.filters.get(id)
    }
}

/// Category definitions for one session.
///
/// A store is never mutated after construction; reloading produces a new
/// store that replaces the old one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySchemaStore {
    categories: IndexMap<CategoryId, Category>,
}

impl CategorySchemaStore {
    /// Build a store from categories, keeping their order.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
        }
    }

    /// Build a store from the `GET /categories` payload.
    pub fn from_wire(raw: IndexMap<CategoryId, Category>) -> Self {
        let categories = raw
            .into_iter()
            .map(|(id, mut category)| {
                category.id = id.clone();
                (id, category)
            })
            .collect();
        Self { categories }
    }

    /// Interpret a `GET /categories` response.
    pub fn from_response(response: ApiResponse) -> Result<Self, SiftError> {
        let response = response.into_result()?;
        let raw: IndexMap<CategoryId, Category> = response.json()?;
        let store = Self::from_wire(raw);
        debug!(count = store.len(), "categories loaded");
        Ok(store)
    }

    /// Look up a category.
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Look up a filter schema.
    pub fn filter_schema(&self, category: &str, filter: &str) -> Option<&FilterSchema> {
        self.get(category).and_then(|c| c.filter(filter))
    }

    /// Display title of a category, falling back to its id.
    pub fn display_title(&self, id: &str) -> String {
        self.get(id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Category ids in server order.
    pub fn ids(&self) -> impl Iterator<Item = &CategoryId> {
        self.categories.keys()
    }

    /// Categories in server order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Check if a category exists.
    pub fn contains(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "docs": {
                "title": "Documents",
                "description": "Office documents",
                "filters": {
                    "lang": {
                        "type": "term",
                        "description": "Language",
                        "values": {"en": "English", "ru": "Russian"}
                    },
                    "pages": {"type": "range", "description": "Pages", "min": 1, "max": 500}
                }
            },
            "maps": {
                "title": "Maps",
                "filters": {
                    "area": {"type": "geo_bounding_box", "description": "Area"},
                    "shape": {"type": "polygon", "description": "Shape"}
                }
            }
        })
    }

    #[test]
    fn test_from_response_keeps_order_and_ids() {
        let store =
            CategorySchemaStore::from_response(ApiResponse::from_json(200, &sample_payload()))
                .unwrap();

        let ids: Vec<&str> = store.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["docs", "maps"]);
        assert_eq!(store.get("docs").unwrap().id.as_str(), "docs");
        assert_eq!(store.get("maps").unwrap().description, "");
    }

    #[test]
    fn test_filter_schema_parsing() {
        let store =
            CategorySchemaStore::from_response(ApiResponse::from_json(200, &sample_payload()))
                .unwrap();

        let lang = store.filter_schema("docs", "lang").unwrap();
        assert_eq!(lang.kind, FilterKind::Term);
        assert_eq!(lang.values.get("ru").map(String::as_str), Some("Russian"));

        let pages = store.filter_schema("docs", "pages").unwrap();
        assert_eq!(pages.min, Some(1.into()));
        assert_eq!(pages.max, Some(500.into()));
    }

    #[test]
    fn test_unknown_filter_type_is_inert() {
        let store =
            CategorySchemaStore::from_response(ApiResponse::from_json(200, &sample_payload()))
                .unwrap();

        let shape = store.filter_schema("maps", "shape").unwrap();
        assert_eq!(shape.kind, FilterKind::Unsupported("polygon".to_string()));
        assert_eq!(shape.kind.as_str(), "polygon");
    }

    #[test]
    fn test_failed_response() {
        let result = CategorySchemaStore::from_response(ApiResponse::new(500, "", Vec::new()));
        assert!(matches!(result, Err(SiftError::Server { status: 500 })));
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let store = CategorySchemaStore::new(vec![Category::new("docs", "Documents")]);
        assert_eq!(store.display_title("docs"), "Documents");
        assert_eq!(store.display_title("ghost"), "ghost");
    }
}
