//! Search query composition.

use serde::Serialize;
use tracing::debug;

use crate::ids::CategoryId;
use crate::search::FilterState;

/// The payload sent to the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Free-text query.
    pub text: String,
    /// Categories to search, in selection order.
    pub categories: Vec<CategoryId>,
    /// Stored filter values, including those of unselected categories.
    pub filters: FilterState,
}

impl SearchQuery {
    /// Create a text-only query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add a category.
    pub fn with_category(mut self, id: impl Into<CategoryId>) -> Self {
        self.categories.push(id.into());
        self
    }

    /// Replace the filter payload.
    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    /// Check if no category is selected.
    pub fn is_unscoped(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Merge free text, selected categories and filter state into one query.
///
/// Filter entries are copied unchanged; entries for categories that are
/// not selected are not pruned.
pub fn compose(text: &str, selected: &[CategoryId], filters: &FilterState) -> SearchQuery {
    debug!(
        categories = selected.len(),
        filtered = filters.len(),
        "composing search query"
    );
    SearchQuery {
        text: text.to_string(),
        categories: selected.to_vec(),
        filters: filters.clone(),
    }
}
