//! Category catalog module.
//!
//! Contains category definitions, filter schemas, and category selection.

mod category;
mod selection;

pub use category::{Category, CategorySchemaStore, FilterKind, FilterSchema};
pub use selection::{CategorySelection, CheckAllState};
