//! CLI command implementations.

pub mod auth;
pub mod bucket;
pub mod categories;
pub mod config;
pub mod search;

use clap::{Args, Subcommand};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Username (prompted if omitted).
    #[arg(short, long)]
    pub username: Option<String>,

    /// Organization (default from config).
    #[arg(long)]
    pub org: Option<String>,

    /// Do not persist the session.
    #[arg(long)]
    pub no_remember: bool,
}

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    /// Also list each category's filters.
    #[arg(long)]
    pub filters: bool,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query.
    pub text: String,

    /// Category to search (repeatable).
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// Search every category.
    #[arg(long, conflicts_with = "categories")]
    pub all: bool,

    /// Filter value as CATEGORY.FILTER=JSON (repeatable).
    #[arg(short = 'f', long = "filter")]
    pub filters: Vec<String>,

    /// Add every result to the bucket.
    #[arg(long)]
    pub add: bool,
}

/// Arguments for the bucket command.
#[derive(Args)]
pub struct BucketArgs {
    #[command(subcommand)]
    pub command: Option<BucketCommand>,
}

#[derive(Subcommand)]
pub enum BucketCommand {
    /// List bucket contents.
    List,
    /// Add a document.
    Add {
        /// Category id.
        category: String,
        /// Document id.
        document: String,
    },
    /// Remove a document.
    Remove {
        /// Category id.
        category: String,
        /// Document id.
        document: String,
    },
    /// Remove everything.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
