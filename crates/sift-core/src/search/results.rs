//! Search result records and response handling.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::CategorySchemaStore;
use crate::ids::{CategoryId, DocumentId};
use crate::{ApiResponse, SiftError};

/// `POST /search` response body: category -> document -> description.
pub type RawSearchResponse = IndexMap<CategoryId, IndexMap<DocumentId, Value>>;

/// One row of search output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub category_id: CategoryId,
    /// Category title, or the id when the category is unknown.
    pub category_title: String,
    pub document_id: DocumentId,
    /// Opaque document payload.
    pub description: Value,
}

impl ResultRecord {
    /// The description rendered as indented JSON.
    pub fn description_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.description)
            .unwrap_or_else(|_| self.description.to_string())
    }
}

/// Outcome of a search request.
#[derive(Debug)]
pub enum SearchOutcome {
    /// At least one record.
    Matches(Vec<ResultRecord>),
    /// The search succeeded with nothing to show.
    NoMatches,
    /// The request failed.
    Failed(SiftError),
}

impl SearchOutcome {
    /// Records, empty unless the search matched.
    pub fn records(&self) -> &[ResultRecord] {
        match self {
            SearchOutcome::Matches(records) => records,
            SearchOutcome::NoMatches | SearchOutcome::Failed(_) => &[],
        }
    }

    /// Check if the request failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, SearchOutcome::Failed(_))
    }
}

/// Flatten a response into records, keeping the response's own order.
pub fn flatten(raw: RawSearchResponse, catalog: &CategorySchemaStore) -> Vec<ResultRecord> {
    let mut records = Vec::new();
    for (category_id, documents) in raw {
        let category_title = catalog.display_title(category_id.as_str());
        for (document_id, description) in documents {
            records.push(ResultRecord {
                category_id: category_id.clone(),
                category_title: category_title.clone(),
                document_id,
                description,
            });
        }
    }
    records
}

/// The server answers `[]` or `null` instead of `{}` when nothing matched.
fn decode_body(body: Value) -> Result<RawSearchResponse, SiftError> {
    match body {
        Value::Null => Ok(RawSearchResponse::new()),
        Value::Array(items) if items.is_empty() => Ok(RawSearchResponse::new()),
        other => serde_json::from_value(other).map_err(|e| SiftError::Decode(e.to_string())),
    }
}

/// Interpret a `POST /search` response.
///
/// Every non-success status, and a body that is not the expected nested
/// mapping, is a failure. An empty mapping is [`SearchOutcome::NoMatches`].
pub fn on_result(response: ApiResponse, catalog: &CategorySchemaStore) -> SearchOutcome {
    let raw = match response
        .into_result()
        .and_then(|r| r.json::<Value>())
        .and_then(decode_body)
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "search failed");
            return SearchOutcome::Failed(e);
        }
    };

    let records = flatten(raw, catalog);
    debug!(count = records.len(), "search results");
    if records.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use serde_json::json;

    fn catalog() -> CategorySchemaStore {
        CategorySchemaStore::new(vec![
            Category::new("docs", "Documents"),
            Category::new("maps", "Maps"),
        ])
    }

    #[test]
    fn test_flatten_preserves_response_order() {
        let body = json!({
            "maps": {"z-1": {"name": "Zeta"}, "a-2": {"name": "Alpha"}},
            "docs": {"d-9": "plain"}
        });
        let outcome = on_result(ApiResponse::from_json(200, &body), &catalog());

        let rows: Vec<(&str, &str)> = outcome
            .records()
            .iter()
            .map(|r| (r.category_id.as_str(), r.document_id.as_str()))
            .collect();
        assert_eq!(rows, vec![("maps", "z-1"), ("maps", "a-2"), ("docs", "d-9")]);
        assert_eq!(outcome.records()[0].category_title, "Maps");
        assert_eq!(outcome.records()[2].description, json!("plain"));
    }

    #[test]
    fn test_empty_response_is_no_matches() {
        let outcome = on_result(ApiResponse::from_json(200, &json!({})), &catalog());
        assert!(matches!(outcome, SearchOutcome::NoMatches));
        assert!(!outcome.is_failure());

        let outcome = on_result(
            ApiResponse::from_json(200, &json!({"docs": {}})),
            &catalog(),
        );
        assert!(matches!(outcome, SearchOutcome::NoMatches));
    }

    #[test]
    fn test_non_success_is_failure() {
        let outcome = on_result(ApiResponse::new(500, "", Vec::new()), &catalog());
        assert!(outcome.is_failure());
        assert!(outcome.records().is_empty());

        let outcome = on_result(ApiResponse::network_failure("TIMEOUT"), &catalog());
        assert!(matches!(outcome, SearchOutcome::Failed(SiftError::Network(_))));
    }

    #[test]
    fn test_empty_array_or_null_is_no_matches() {
        for body in [json!([]), Value::Null] {
            let outcome = on_result(ApiResponse::from_json(200, &body), &catalog());
            assert!(matches!(outcome, SearchOutcome::NoMatches), "body {}", body);
        }
    }

    #[test]
    fn test_malformed_body_is_failure() {
        let outcome = on_result(ApiResponse::from_json(200, &json!([1, 2])), &catalog());
        assert!(matches!(outcome, SearchOutcome::Failed(SiftError::Decode(_))));
    }

    #[test]
    fn test_unknown_category_uses_id_as_title() {
        let body = json!({"archive": {"x": null}});
        let outcome = on_result(ApiResponse::from_json(200, &body), &catalog());
        assert_eq!(outcome.records()[0].category_title, "archive");
    }
}
