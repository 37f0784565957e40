//! Bucket commands.

use anyhow::Result;
use dialoguer::Confirm;
use serde_json::json;
use sift_core::bucket::BucketItem;

use super::{BucketArgs, BucketCommand};
use crate::context::{App, Context};

/// Run the bucket command.
pub async fn run(args: BucketArgs, ctx: &Context) -> Result<()> {
    let app = ctx.session().await?;

    match args.command {
        Some(BucketCommand::List) | None => list(&app, ctx),
        Some(BucketCommand::Add { category, document }) => {
            app.add_to_bucket(BucketItem::new(document, category)).await?;
            finish(&app, ctx)
        }
        Some(BucketCommand::Remove { category, document }) => {
            app.remove_from_bucket(&BucketItem::new(document, category))
                .await?;
            finish(&app, ctx)
        }
        Some(BucketCommand::Clear { yes }) => {
            if !yes && !ctx.output.is_json() {
                let count = app.bucket()?.count();
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove all {} item(s) from the bucket?", count))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.info("Cancelled.");
                    return Ok(());
                }
            }
            app.clear_bucket().await?;
            finish(&app, ctx)
        }
    }
}

fn list(app: &App, ctx: &Context) -> Result<()> {
    let bucket = app.bucket()?;
    let items = bucket.items();

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return Ok(());
    }

    if items.is_empty() {
        ctx.output.info("The bucket is empty.");
        return Ok(());
    }

    let catalog = app.catalog();
    ctx.output.header(&format!(
        "Bucket ({} item(s), {})",
        items.len(),
        bucket.variant()
    ));
    ctx.output.table_row(&["CATEGORY", "DOCUMENT"], &[20, 0]);
    for item in &items {
        let title = catalog.display_title(item.category_id.as_str());
        ctx.output
            .table_row(&[title.as_str(), item.document_id.as_str()], &[20, 0]);
    }
    Ok(())
}

fn finish(app: &App, ctx: &Context) -> Result<()> {
    let notices = app.take_notices();
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "notices": notices,
            "count": app.bucket()?.count(),
        }));
    } else {
        ctx.output.notices(&notices);
    }
    Ok(())
}
