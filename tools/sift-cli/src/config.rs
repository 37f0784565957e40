//! CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sift_core::bucket::BucketVariant;
use sift_core::session::DEFAULT_ORGANIZATION;
use sift_data::{ClientConfig, DEFAULT_BASE_URL};

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["sift.toml", ".sift.toml", "sift.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiftConfig {
    /// Server connection.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bucket storage.
    #[serde(default)]
    pub bucket: BucketConfig,

    /// Local durable storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Login defaults.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl SiftConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Find a config file in `start` or one of its parents.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Directory holding the durable slots.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage.dir.clone().unwrap_or_else(default_storage_dir)
    }

    /// Transport settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.server.base_url.clone())
            .with_timeout(Duration::from_secs(self.server.timeout_secs))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Server connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for every request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bucket storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// `offline` or `remote`.
    #[serde(default)]
    pub mode: BucketVariant,
}

/// Local durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Slot directory (default: `$HOME/.local/share/sift`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Login defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Organization sent with the username.
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Persist the session token after login.
    #[serde(default = "default_true")]
    pub remember: bool,
}

fn default_organization() -> String {
    DEFAULT_ORGANIZATION.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            remember: true,
        }
    }
}

/// Get the platform-specific data directory for sift.
pub fn default_storage_dir() -> PathBuf {
    let base = match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share"),
        None => std::env::temp_dir(),
    };
    base.join("sift")
}

/// Generate a default sift.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# sift configuration

[server]
base_url = "{base_url}"
timeout_secs = {timeout}

[bucket]
# "offline" keeps the bucket in local storage, "remote" on the server.
mode = "offline"

[storage]
# dir = "/var/lib/sift"

[auth]
organization = "{organization}"
remember = true
"#,
        base_url = DEFAULT_BASE_URL,
        timeout = default_timeout_secs(),
        organization = DEFAULT_ORGANIZATION,
    )
}
