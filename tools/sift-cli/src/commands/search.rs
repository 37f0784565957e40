//! Search command.

use anyhow::{anyhow, bail, Context as _, Result};
use serde_json::Value;
use sift_core::bucket::{BucketItem, BucketOutcome};
use sift_core::search::SearchOutcome;
use sift_core::SiftError;

use super::SearchArgs;
use crate::context::Context;
use crate::output::truncate;

/// A parsed `CATEGORY.FILTER=JSON` argument.
#[derive(Debug, PartialEq)]
pub struct FilterArg {
    pub category: String,
    pub filter: String,
    pub value: Value,
}

impl std::str::FromStr for FilterArg {
    type Err = anyhow::Error;

    /// The value is read as JSON; anything that is not valid JSON is taken
    /// as a plain string.
    fn from_str(s: &str) -> Result<Self> {
        let (target, raw) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected CATEGORY.FILTER=VALUE, got '{}'", s))?;
        let (category, filter) = target
            .split_once('.')
            .ok_or_else(|| anyhow!("Expected CATEGORY.FILTER before '=', got '{}'", target))?;
        if category.is_empty() || filter.is_empty() {
            bail!("Empty category or filter in '{}'", s);
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(Self {
            category: category.to_string(),
            filter: filter.to_string(),
            value,
        })
    }
}

/// Run a search.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let filters = args
        .filters
        .iter()
        .map(|f| f.parse::<FilterArg>())
        .collect::<Result<Vec<_>>>()?;

    let app = ctx.session().await?;

    if args.all {
        app.select_all_categories();
    }
    for category in &args.categories {
        app.select_category(category)?;
    }
    for arg in filters {
        let value = app
            .set_filter(&arg.category, &arg.filter, arg.value)
            .with_context(|| format!("Cannot set filter {}.{}", arg.category, arg.filter))?;
        tracing::debug!(category = %arg.category, filter = %arg.filter, ?value, "filter applied");
    }

    let spinner = ctx.output.spinner("Searching");
    let outcome = app.search(&args.text).await;
    spinner.finish_and_clear();

    let records = match outcome? {
        Some(SearchOutcome::Matches(records)) => records,
        Some(SearchOutcome::NoMatches) | None => Vec::new(),
        Some(SearchOutcome::Failed(e)) => {
            app.take_notices();
            return Err(anyhow::Error::new(e).context("Search failed"));
        }
    };
    let notices = app.take_notices();

    let mut added = 0;
    if args.add {
        for record in &records {
            match app.add_to_bucket(BucketItem::from(record)).await {
                Ok(BucketOutcome::Added) => added += 1,
                Ok(_) => {}
                Err(e) => {
                    app.take_notices();
                    return Err(partial_add(e, added, records.len()));
                }
            }
        }
        app.take_notices();
    }

    if ctx.output.is_json() {
        ctx.output.json(&records);
        return Ok(());
    }

    ctx.output.notices(&notices);
    if !records.is_empty() {
        ctx.output.header(&format!("{} result(s)", records.len()));
        ctx.output
            .table_row(&["CATEGORY", "DOCUMENT", "DESCRIPTION"], &[20, 24, 0]);
        for record in &records {
            let description = truncate(&record.description.to_string(), 60);
            ctx.output.table_row(
                &[
                    record.category_title.as_str(),
                    record.document_id.as_str(),
                    description.as_str(),
                ],
                &[20, 24, 0],
            );
        }
    }
    if args.add {
        ctx.output.success(&format!(
            "{} of {} result(s) added to the bucket",
            added,
            records.len()
        ));
    }
    Ok(())
}

/// Error for an `--add` run that stopped part way.
fn partial_add(error: SiftError, added: usize, total: usize) -> anyhow::Error {
    anyhow::Error::new(error).context(format!(
        "{} of {} result(s) added to the bucket before it failed",
        added, total
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_value() {
        let arg: FilterArg = "docs.lang=[\"en\",\"ru\"]".parse().unwrap();
        assert_eq!(
            arg,
            FilterArg {
                category: "docs".into(),
                filter: "lang".into(),
                value: json!(["en", "ru"]),
            }
        );
    }

    #[test]
    fn test_parse_plain_string() {
        let arg: FilterArg = "docs.lang=en".parse().unwrap();
        assert_eq!(arg.value, json!("en"));
    }

    #[test]
    fn test_value_may_contain_separators() {
        let arg: FilterArg = "maps.area=[55.1,37.2,55.9,37.9]".parse().unwrap();
        assert_eq!(arg.category, "maps");
        assert_eq!(arg.filter, "area");
        assert_eq!(arg.value, json!([55.1, 37.2, 55.9, 37.9]));
    }

    #[test]
    fn test_partial_add_reports_count() {
        let err = partial_add(SiftError::Server { status: 503 }, 2, 5);
        assert_eq!(
            format!("{:#}", err),
            "2 of 5 result(s) added to the bucket before it failed: Server error: HTTP 503"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("docs.lang".parse::<FilterArg>().is_err());
        assert!("lang=en".parse::<FilterArg>().is_err());
        assert!(".lang=en".parse::<FilterArg>().is_err());
    }
}
