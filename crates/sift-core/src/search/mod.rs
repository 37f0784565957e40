//! Search module.
//!
//! Contains filter state, query composition, and result handling.

mod filter;
mod query;
mod results;

pub use filter::{unset, FilterState, FilterStateEngine, FilterValue, ResolvedFilter, DATE_FORMAT};
pub use query::{compose, SearchQuery};
pub use results::{flatten, on_result, RawSearchResponse, ResultRecord, SearchOutcome};
