//! Per-category filter values and their schema-derived defaults.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;

use crate::catalog::{FilterKind, FilterSchema};
use crate::ids::{CategoryId, FilterId};

/// Wire format of dates inside a date range.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A selected filter value.
///
/// Serializes to the bare JSON shape the search endpoint expects: an
/// array of keys for term filters and fixed-length arrays (with `null`
/// for unset slots) for the interval and geo filters. Numbers keep the
/// exact JSON form they arrived in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Selected term keys, without duplicates.
    Terms(Vec<String>),
    /// `[min, max]`.
    Range([Option<Number>; 2]),
    /// `[start, end]`.
    DateRange([Option<NaiveDate>; 2]),
    /// `[lat1, lon1, lat2, lon2]`.
    GeoBoundingBox([Option<Number>; 4]),
    /// `[lat, lon, meters]`.
    GeoDistance([Option<Number>; 3]),
    /// A value whose shape does not match any known type. Sent as-is.
    Raw(Value),
}

impl FilterValue {
    /// Build a term selection, dropping repeated keys.
    pub fn terms<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !selected.contains(&key) {
                selected.push(key);
            }
        }
        FilterValue::Terms(selected)
    }

    /// Build a numeric range.
    pub fn range(min: Option<Number>, max: Option<Number>) -> Self {
        FilterValue::Range([min, max])
    }

    /// Build a date range.
    pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        FilterValue::DateRange([start, end])
    }

    /// Default value for a schema, `None` for types that hold no value.
    pub fn default_for(schema: &FilterSchema) -> Option<Self> {
        match &schema.kind {
            FilterKind::Term => Some(FilterValue::Terms(Vec::new())),
            FilterKind::Range => Some(FilterValue::Range([
                schema.min.clone(),
                schema.max.clone(),
            ])),
            FilterKind::DateRange => Some(FilterValue::DateRange([None; 2])),
            FilterKind::GeoBoundingBox => Some(FilterValue::GeoBoundingBox(unset())),
            FilterKind::GeoDistance => Some(FilterValue::GeoDistance(unset())),
            FilterKind::FullText | FilterKind::Unsupported(_) => None,
        }
    }

    /// Interpret a JSON value against a filter type.
    ///
    /// Values that do not have the type's shape are kept as [`FilterValue::Raw`].
    /// A bare string is accepted as a single term key.
    pub fn from_json(kind: &FilterKind, value: Value) -> Self {
        let parsed = match kind {
            FilterKind::Term => match &value {
                Value::String(key) => Some(FilterValue::terms([key.clone()])),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(FilterValue::terms),
                _ => None,
            },
            FilterKind::Range => numbers::<2>(&value).map(FilterValue::Range),
            FilterKind::DateRange => dates(&value).map(FilterValue::DateRange),
            FilterKind::GeoBoundingBox => numbers::<4>(&value).map(FilterValue::GeoBoundingBox),
            FilterKind::GeoDistance => numbers::<3>(&value).map(FilterValue::GeoDistance),
            FilterKind::FullText | FilterKind::Unsupported(_) => None,
        };
        parsed.unwrap_or(FilterValue::Raw(value))
    }

    /// Check if the value has the shape of a filter type.
    pub fn conforms_to(&self, kind: &FilterKind) -> bool {
        matches!(
            (self, kind),
            (FilterValue::Terms(_), FilterKind::Term)
                | (FilterValue::Range(_), FilterKind::Range)
                | (FilterValue::DateRange(_), FilterKind::DateRange)
                | (FilterValue::GeoBoundingBox(_), FilterKind::GeoBoundingBox)
                | (FilterValue::GeoDistance(_), FilterKind::GeoDistance)
        )
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Terms(keys) => keys.is_empty(),
            FilterValue::Range(slots) => slots.iter().all(Option::is_none),
            FilterValue::DateRange(slots) => slots.iter().all(Option::is_none),
            FilterValue::GeoBoundingBox(slots) => slots.iter().all(Option::is_none),
            FilterValue::GeoDistance(slots) => slots.iter().all(Option::is_none),
            FilterValue::Raw(value) => value.is_null(),
        }
    }
}

/// All slots unset.
pub fn unset<const N: usize>() -> [Option<Number>; N] {
    std::array::from_fn(|_| None)
}

fn numbers<const N: usize>(value: &Value) -> Option<[Option<Number>; N]> {
    let items = value.as_array().filter(|items| items.len() == N)?;
    let mut out = unset::<N>();
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = match item {
            Value::Null => None,
            Value::Number(n) => Some(n.clone()),
            _ => return None,
        };
    }
    Some(out)
}

fn dates(value: &Value) -> Option<[Option<NaiveDate>; 2]> {
    let items = value.as_array().filter(|items| items.len() == 2)?;
    let mut out = [None; 2];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = match item {
            Value::Null => None,
            Value::String(s) => Some(NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?),
            _ => return None,
        };
    }
    Some(out)
}

/// What a filter widget should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedFilter<'a> {
    /// A value the user set.
    Stored(&'a FilterValue),
    /// Nothing stored yet; the schema's default.
    Default(FilterValue),
    /// Full-text filter: input goes to the free-text field.
    FreeText,
    /// Unknown type: nothing to render.
    Unsupported,
}

impl ResolvedFilter<'_> {
    /// The value, stored or default.
    pub fn value(&self) -> Option<&FilterValue> {
        match self {
            ResolvedFilter::Stored(value) => Some(value),
            ResolvedFilter::Default(value) => Some(value),
            ResolvedFilter::FreeText | ResolvedFilter::Unsupported => None,
        }
    }
}

/// Category -> filter -> value, in insertion order.
pub type FilterState = IndexMap<CategoryId, IndexMap<FilterId, FilterValue>>;

/// Holds the values the user picked, per category and filter.
///
/// Values survive deselecting their category.
#[derive(Debug, Clone, Default)]
pub struct FilterStateEngine {
    state: FilterState,
}

impl FilterStateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous one.
    pub fn set_filter_value(
        &mut self,
        category: impl Into<CategoryId>,
        filter: impl Into<FilterId>,
        value: FilterValue,
    ) {
        let category = category.into();
        let filter = filter.into();
        debug!(category = %category, filter = %filter, "filter value set");
        self.state.entry(category).or_default().insert(filter, value);
    }

    /// Value to present for a filter: the stored one, else the default
    /// derived from `schema`.
    pub fn get_filter_value<'a>(
        &'a self,
        category: &str,
        filter: &str,
        schema: &FilterSchema,
    ) -> ResolvedFilter<'a> {
        if let Some(value) = self.stored(category, filter) {
            return ResolvedFilter::Stored(value);
        }
        match FilterValue::default_for(schema) {
            Some(value) => ResolvedFilter::Default(value),
            None => match schema.kind {
                FilterKind::FullText => ResolvedFilter::FreeText,
                _ => ResolvedFilter::Unsupported,
            },
        }
    }

    /// The stored value, if any.
    pub fn stored(&self, category: &str, filter: &str) -> Option<&FilterValue> {
        self.state.get(category).and_then(|filters| filters.get(filter))
    }

    /// Everything stored so far.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Drop all stored values.
    pub fn reset(&mut self) {
        self.state.clear();
    }
}
