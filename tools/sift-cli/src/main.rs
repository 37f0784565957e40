//! Sift CLI - faceted search over a categorized document service.
//!
//! Commands:
//! - `sift login` / `sift logout` / `sift status` - Manage the session
//! - `sift categories` - List categories and their filters
//! - `sift search` - Run a filtered search
//! - `sift bucket` - Inspect and edit the bucket
//! - `sift config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BucketArgs, CategoriesArgs, ConfigArgs, LoginArgs, SearchArgs};

/// Sift - faceted search and document bucket
#[derive(Parser)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the search service
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// Show session and bucket state
    Status,

    /// List searchable categories
    Categories(CategoriesArgs),

    /// Search documents
    Search(SearchArgs),

    /// Manage the document bucket
    Bucket(BucketArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "sift=debug" } else { "sift=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let output = output::Output::new(cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Login(args) => commands::auth::login(args, &ctx).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Status => commands::auth::status(&ctx).await,
        Commands::Categories(args) => commands::categories::run(args, &ctx).await,
        Commands::Search(args) => commands::search::run(args, &ctx).await,
        Commands::Bucket(args) => commands::bucket::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
