//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use sift_data::HttpBackend;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, SiftConfig, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("[server]");
    ctx.output.kv("base_url", &ctx.config.server.base_url);
    ctx.output
        .kv("timeout_secs", &ctx.config.server.timeout_secs.to_string());

    ctx.output.info("[bucket]");
    ctx.output.kv("mode", ctx.config.bucket.mode.as_str());

    ctx.output.info("[storage]");
    ctx.output
        .kv("dir", &ctx.config.storage_dir().display().to_string());

    ctx.output.info("[auth]");
    ctx.output.kv("organization", &ctx.config.auth.organization);
    ctx.output.kv("remember", &ctx.config.auth.remember.to_string());

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Err(e) = HttpBackend::new(ctx.config.client_config()) {
        errors.push(format!("server.base_url: {}", e));
    }
    if ctx.config.server.timeout_secs == 0 {
        errors.push("server.timeout_secs must be greater than 0".to_string());
    }
    if ctx.config.auth.organization.is_empty() {
        errors.push("auth.organization must not be empty".to_string());
    }
    if let Some(dir) = &ctx.config.storage.dir {
        if dir.is_relative() {
            warnings.push(format!(
                "storage.dir '{}' is relative to the working directory",
                dir.display()
            ));
        }
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }
    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");
    Ok(())
}

fn get_config_value(config: &SiftConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["server", "base_url"] => Ok(config.server.base_url.clone()),
        ["server", "timeout_secs"] => Ok(config.server.timeout_secs.to_string()),
        ["bucket", "mode"] => Ok(config.bucket.mode.to_string()),
        ["storage", "dir"] => Ok(config.storage_dir().display().to_string()),
        ["auth", "organization"] => Ok(config.auth.organization.clone()),
        ["auth", "remember"] => Ok(config.auth.remember.to_string()),
        _ => bail!("Unknown config key: {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::bucket::BucketVariant;

    #[test]
    fn test_get_config_value() {
        let mut config = SiftConfig::default();
        config.bucket.mode = BucketVariant::Remote;

        assert_eq!(
            get_config_value(&config, "server.base_url").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(get_config_value(&config, "bucket.mode").unwrap(), "remote");
        assert_eq!(get_config_value(&config, "auth.remember").unwrap(), "true");
    }

    #[test]
    fn test_unknown_key() {
        let config = SiftConfig::default();
        assert!(get_config_value(&config, "server").is_err());
        assert!(get_config_value(&config, "bucket.size").is_err());
    }
}
