//! Global constants used throughout the ai-manager codebase.
//!
//! Environment variable names, on-disk locations and timeouts that are shared
//! by detection, mutation and the command layer live here so they can be
//! discovered in one place.

use std::time::Duration;

/// Prefix for every environment variable the engine reads.
///
/// Per-client overrides are built as `<PREFIX>_<CLIENT>_MCP_CONFIG` and
/// `<PREFIX>_<CLIENT>_SKILLS_DIR`.
pub const ENV_PREFIX: &str = "AI_MANAGER";

/// Environment variable pointing at an alternative engine config file.
pub const CONFIG_ENV_VAR: &str = "AI_MANAGER_CONFIG";

/// Environment variable overriding the backup directory.
pub const BACKUP_DIR_ENV_VAR: &str = "AI_MANAGER_BACKUP_DIR";

/// Name of the engine's own directory under the user's home.
pub const APP_DIR_NAME: &str = ".ai-manager";

/// Name of the backup directory inside [`APP_DIR_NAME`].
pub const BACKUP_DIR_NAME: &str = "backups";

/// Extension appended to every backup file or directory.
pub const BACKUP_EXTENSION: &str = "bak";

/// Manifest file name for directory-installed skills.
pub const SKILL_MANIFEST_FILE: &str = "SKILL.md";

/// Default timeout for `<binary> --version` probes (2 seconds).
///
/// A hung binary must not hold up the rest of detection; on expiry the
/// version is reported as unknown.
pub const DEFAULT_VERSION_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Default version probe timeout as a [`Duration`].
pub fn default_version_probe_timeout() -> Duration {
    Duration::from_millis(DEFAULT_VERSION_PROBE_TIMEOUT_MS)
}

/// Confidence reported when both binary and config evidence resolved.
pub const CONFIDENCE_FULL: u8 = 100;

/// Confidence reported when exactly one evidence field resolved.
pub const CONFIDENCE_PARTIAL: u8 = 60;

/// Confidence reported when nothing resolved or detection failed.
pub const CONFIDENCE_NONE: u8 = 0;
