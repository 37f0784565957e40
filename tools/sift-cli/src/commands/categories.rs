//! Category listing.

use anyhow::Result;
use serde_json::{Map, Value};
use sift_core::catalog::{FilterKind, FilterSchema};
use sift_core::search::FilterValue;

use super::CategoriesArgs;
use crate::context::Context;

/// List categories and, optionally, their filters.
pub async fn run(args: CategoriesArgs, ctx: &Context) -> Result<()> {
    let app = ctx.session().await?;
    let catalog = app.catalog();

    if ctx.output.is_json() {
        let mut categories = Map::new();
        for category in catalog.iter() {
            categories.insert(category.id.to_string(), serde_json::to_value(category)?);
        }
        ctx.output.json(&categories);
        return Ok(());
    }

    if catalog.is_empty() {
        ctx.output.info("No categories available.");
        return Ok(());
    }

    for category in catalog.iter() {
        ctx.output
            .header(&format!("{} ({})", category.title, category.id));
        if !category.description.is_empty() {
            ctx.output.kv("description", &category.description);
        }
        if !args.filters {
            continue;
        }
        for (filter_id, schema) in &category.filters {
            let label = if schema.description.is_empty() {
                filter_id.to_string()
            } else {
                format!("{} ({})", filter_id, schema.description)
            };
            ctx.output.kv(&label, &describe_filter(schema));
        }
    }
    Ok(())
}

/// One-line description of what a filter accepts and its default.
pub fn describe_filter(schema: &FilterSchema) -> String {
    let accepts = match &schema.kind {
        FilterKind::Term => {
            let keys: Vec<String> = schema
                .values
                .iter()
                .map(|(key, label)| format!("{}={}", key, label))
                .collect();
            format!("term, any of [{}]", keys.join(", "))
        }
        FilterKind::Range => "range [min, max]".to_string(),
        FilterKind::DateRange => "date_range [YYYY-MM-DD, YYYY-MM-DD]".to_string(),
        FilterKind::GeoBoundingBox => "geo_bounding_box [lat1, lon1, lat2, lon2]".to_string(),
        FilterKind::GeoDistance => "geo_distance [lat, lon, meters]".to_string(),
        FilterKind::FullText => return "full_text, matched by the search text".to_string(),
        FilterKind::Unsupported(kind) => return format!("{} (not supported)", kind),
    };

    match FilterValue::default_for(schema).and_then(|v| serde_json::to_value(v).ok()) {
        Some(default) if default != Value::Null => format!("{}, default {}", accepts, default),
        _ => accepts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_term() {
        let schema = FilterSchema::term("Language", [("en", "English"), ("ru", "Russian")]);
        assert_eq!(
            describe_filter(&schema),
            "term, any of [en=English, ru=Russian], default []"
        );
    }

    #[test]
    fn test_describe_range_default() {
        let schema = FilterSchema::range("Pages", 1, 500);
        assert_eq!(
            describe_filter(&schema),
            "range [min, max], default [1,500]"
        );
    }

    #[test]
    fn test_describe_inert_types() {
        let text = FilterSchema::new(FilterKind::FullText, "Body");
        assert_eq!(describe_filter(&text), "full_text, matched by the search text");

        let odd = FilterSchema::new(FilterKind::Unsupported("polygon".into()), "Shape");
        assert_eq!(describe_filter(&odd), "polygon (not supported)");
    }
}
