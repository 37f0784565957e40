//! The set of categories a search is scoped to.

use crate::catalog::CategorySchemaStore;
use crate::ids::CategoryId;

/// State of a "select all" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckAllState {
    /// Nothing selected.
    None,
    /// Some but not all categories selected.
    Partial,
    /// Every category selected.
    All,
}

/// Selected category ids, in the order they were checked.
///
/// Deselecting a category only removes it from this list; its filter
/// values stay in the filter engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    checked: Vec<CategoryId>,
}

impl CategorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a category. Selecting twice is a no-op.
    pub fn select(&mut self, id: impl Into<CategoryId>) {
        let id = id.into();
        if !self.checked.contains(&id) {
            self.checked.push(id);
        }
    }

    /// Deselect a category.
    pub fn deselect(&mut self, id: &str) -> bool {
        let len_before = self.checked.len();
        self.checked.retain(|c| c.as_str() != id);
        self.checked.len() < len_before
    }

    /// Flip a category; returns whether it is now selected.
    pub fn toggle(&mut self, id: impl Into<CategoryId>) -> bool {
        let id = id.into();
        if self.deselect(id.as_str()) {
            false
        } else {
            self.checked.push(id);
            true
        }
    }

    /// Select every category of the store, in store order.
    pub fn select_all(&mut self, store: &CategorySchemaStore) {
        self.checked = store.ids().cloned().collect();
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.checked.clear();
    }

    /// Check if a category is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.checked.iter().any(|c| c.as_str() == id)
    }

    /// Selected ids.
    pub fn selected(&self) -> &[CategoryId] {
        &self.checked
    }

    /// Tri-state of the "select all" control against a store.
    pub fn check_all_state(&self, store: &CategorySchemaStore) -> CheckAllState {
        let selected = store.ids().filter(|id| self.is_selected(id.as_str())).count();
        if selected == 0 {
            CheckAllState::None
        } else if selected == store.len() {
            CheckAllState::All
        } else {
            CheckAllState::Partial
        }
    }
}
