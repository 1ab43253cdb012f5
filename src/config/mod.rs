//! Engine configuration.
//!
//! Settings are read from `~/.ai-manager/config.toml`. Every field is
//! optional and a missing file means defaults:
//!
//! ```toml
//! # Where backups are written (default: ~/.ai-manager/backups)
//! backup_dir = "~/ai-backups"
//!
//! # Upper bound for `<binary> --version` during detection
//! version_probe_timeout_ms = 2000
//!
//! # Probe versions on every `detect` unless told otherwise
//! include_versions = false
//! ```
//!
//! The file location can be overridden with `AI_MANAGER_CONFIG` or the
//! `--config` flag, and the backup directory with `AI_MANAGER_BACKUP_DIR`.

use crate::constants::{
    APP_DIR_NAME, BACKUP_DIR_ENV_VAR, BACKUP_DIR_NAME, CONFIG_ENV_VAR,
    DEFAULT_VERSION_PROBE_TIMEOUT_MS,
};
use crate::paths::{EnvSource, expand_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Engine settings loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Backup root; `~` is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Timeout for version probes in milliseconds
    pub version_probe_timeout_ms: u64,

    /// Default for `detect --include-versions`
    pub include_versions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backup_dir: None,
            version_probe_timeout_ms: DEFAULT_VERSION_PROBE_TIMEOUT_MS,
            include_versions: false,
        }
    }
}

impl EngineConfig {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined, or if
    /// the file exists but cannot be read or parsed.
    pub async fn load(env: &dyn EnvSource) -> Result<Self> {
        Self::load_with_optional(None, env).await
    }

    /// Load from `path` when given, otherwise from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>, env: &dyn EnvSource) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path(env)?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No engine config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read engine config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse engine config from {}", path.display()))
    }

    /// `AI_MANAGER_CONFIG` when set, else `~/.ai-manager/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory cannot
    /// be determined.
    pub fn default_path(env: &dyn EnvSource) -> Result<PathBuf> {
        if let Some(value) = env.non_empty_var(CONFIG_ENV_VAR) {
            return Ok(expand_path(&value, env));
        }
        Ok(app_dir(env)?.join("config.toml"))
    }

    /// Backup root: `AI_MANAGER_BACKUP_DIR`, then `backup_dir`, then
    /// `~/.ai-manager/backups`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default is needed and the home directory
    /// cannot be determined.
    pub fn backup_root(&self, env: &dyn EnvSource) -> Result<PathBuf> {
        if let Some(value) = env.non_empty_var(BACKUP_DIR_ENV_VAR) {
            return Ok(expand_path(&value, env));
        }
        if let Some(dir) = &self.backup_dir {
            return Ok(expand_path(&dir.to_string_lossy(), env));
        }
        Ok(app_dir(env)?.join(BACKUP_DIR_NAME))
    }

    /// Version probe timeout as a [`Duration`].
    #[must_use]
    pub fn version_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.version_probe_timeout_ms)
    }
}

fn app_dir(env: &dyn EnvSource) -> Result<PathBuf> {
    Ok(env
        .home_dir()
        .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
        .join(APP_DIR_NAME))
}
