//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use sift_cache::Cache;
use sift_core::notice::Notice;
use sift_core::{AppState, View};
use sift_data::HttpBackend;
use tracing::debug;

use crate::config::SiftConfig;
use crate::output::Output;

/// The application state used by every command.
pub type App = AppState<HttpBackend>;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: SiftConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or the nearest one.
    pub fn load(config_path: Option<&Path>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => SiftConfig::discover(&cwd),
        };
        let config = match &config_path {
            Some(path) => SiftConfig::load(path)?,
            None => SiftConfig::default(),
        };
        debug!(config = ?config_path, "configuration loaded");

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build the application state from the configuration.
    pub fn app(&self) -> Result<App> {
        let http = HttpBackend::new(self.config.client_config())
            .context("Invalid [server] configuration")?;
        let dir = self.config.storage_dir();
        let cache = Cache::open(&dir)
            .with_context(|| format!("Failed to open storage: {}", dir.display()))?;
        Ok(AppState::new(Arc::new(http), cache, self.config.bucket.mode))
    }

    /// Build the application state and restore the stored session.
    ///
    /// Fails when there is no valid session.
    pub async fn session(&self) -> Result<App> {
        let app = self.app()?;
        let spinner = self.output.spinner("Connecting");
        let view = app.start().await;
        spinner.finish_and_clear();
        self.output.notices(&surfaced(app.take_notices(), view.is_err()));

        if view? != View::Search {
            bail!("Not logged in. Run `sift login` first.");
        }
        Ok(app)
    }
}

/// Notices to print once an operation has finished. A failed operation is
/// reported through its error alone, so its notices are dropped.
pub fn surfaced(notices: Vec<Notice>, failed: bool) -> Vec<Notice> {
    if failed {
        Vec::new()
    } else {
        notices
    }
}
