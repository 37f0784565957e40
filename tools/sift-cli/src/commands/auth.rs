//! Session commands: login, logout, status.

use anyhow::Result;
use dialoguer::{Input, Password};
use serde_json::json;

use super::LoginArgs;
use crate::context::Context;
use sift_core::View;

/// Log in and persist the session.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let username = match args.username {
        Some(username) => username,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;
    let organization = args
        .org
        .unwrap_or_else(|| ctx.config.auth.organization.clone());
    let remember = ctx.config.auth.remember && !args.no_remember;

    let app = ctx.app()?;
    let spinner = ctx.output.spinner("Logging in");
    let result = app.login(&username, &organization, &password, remember).await;
    spinner.finish_and_clear();
    let credentials = result?;
    ctx.output.notices(&app.take_notices());

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "username": credentials.username,
            "organization": organization,
            "remembered": remember,
        }));
        return Ok(());
    }

    ctx.output
        .success(&format!("Logged in as {} ({})", credentials.username, organization));
    if !remember {
        ctx.output
            .warn("Session not saved; the next command will need a new login.");
    }
    Ok(())
}

/// End the session.
pub async fn logout(ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    app.logout().await?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "logged_out": true }));
    } else {
        ctx.output.success("Logged out");
    }
    Ok(())
}

/// Show the session and bucket state.
pub async fn status(ctx: &Context) -> Result<()> {
    let app = ctx.app()?;
    let view = app.start().await?;
    let notices = app.take_notices();

    let credentials = app.credentials();
    let bucket = app.bucket().ok();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "server": ctx.config.server.base_url,
            "logged_in": view == View::Search,
            "username": credentials.as_ref().map(|c| c.username.clone()),
            "bucket_mode": ctx.config.bucket.mode,
            "bucket_count": bucket.as_ref().map(|b| b.count()),
            "categories": app.catalog().len(),
        }));
        return Ok(());
    }

    ctx.output.notices(&notices);
    ctx.output.header("Status");
    ctx.output.kv("server", &ctx.config.server.base_url);
    match credentials {
        Some(credentials) => ctx.output.kv("user", &credentials.username),
        None => ctx.output.kv("user", "(not logged in)"),
    }
    ctx.output.kv("bucket", ctx.config.bucket.mode.as_str());
    if let Some(bucket) = bucket {
        ctx.output.kv("items", &bucket.count().to_string());
        ctx.output
            .kv("categories", &app.catalog().len().to_string());
    }
    Ok(())
}
