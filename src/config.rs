//! Client configuration
//!
//! Settings come from three places, highest priority first:
//! 1. Command-line flags and their `CLOUDCTL_*` environment variables
//! 2. `config.toml` in the config directory
//! 3. Built-in defaults

use anyhow::{Context, Result};
use nexus::ConnectionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable to override the config directory
pub const ENV_CONFIG_DIR: &str = "CLOUDCTL_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

/// Get the cloudctl config directory path
///
/// Priority:
/// 1. `CLOUDCTL_CONFIG_DIR` env var
/// 2. Platform config dir (`~/.config/cloudctl` on Linux)
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand_path(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("cloudctl"))
}

/// Path of the config file, honoring an explicit `--config` override.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand_path(&path.to_string_lossy())),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Cloud operations API address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API version header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Skip confirmation prompts
    pub auto_confirm: bool,

    /// Per-request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl CloudConfig {
    /// Load config from `path`, or defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Merge command-line values over this file config.
    pub fn resolve(&self, overrides: &Overrides) -> Resolved {
        let mut settings = ConnectionSettings::default();

        if let Some(server) = overrides.server.as_ref().or(self.server.as_ref()) {
            settings.server.clone_from(server);
        }
        settings.api_key = overrides
            .api_key
            .clone()
            .or_else(|| self.api_key.clone())
            .filter(|key| !key.is_empty());
        if let Some(version) = &self.api_version {
            settings.api_version.clone_from(version);
        }
        if let Some(secs) = self.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }

        Resolved {
            settings,
            auto_confirm: overrides.auto_confirm || self.auto_confirm,
        }
    }
}

/// Values given on the command line (or their environment variables).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub api_key: Option<String>,
    pub auto_confirm: bool,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: ConnectionSettings,
    pub auto_confirm: bool,
}
