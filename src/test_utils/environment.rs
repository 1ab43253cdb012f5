//! Isolated home directory for library and integration tests.

use super::MapEnv;
use crate::adapters::AdapterRegistry;
use crate::backup::BackupManager;
use crate::core::ClientKind;
use crate::detection::DetectorRegistry;
use crate::paths::EnvSource;
use crate::service::AdapterService;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Temporary home with its own search path and backup directory.
///
/// Nothing outside the temporary directory is read or written: the
/// environment is a [`MapEnv`], so the real `HOME` and `PATH` never leak in.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub home: PathBuf,
    pub bin_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub env: MapEnv,
}

impl TestEnvironment {
    /// Create a new test environment
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let home = temp_dir.path().join("home");
        let bin_dir = temp_dir.path().join("bin");
        let backup_dir = temp_dir.path().join("backups");
        fs::create_dir_all(&home)?;
        fs::create_dir_all(&bin_dir)?;

        let env = MapEnv::new().with_home(&home).with_search_path(&[bin_dir.as_path()]);
        Ok(Self {
            temp_dir,
            home,
            bin_dir,
            backup_dir,
            env,
        })
    }

    /// Service over the default registries, backed by this environment.
    pub fn service(&self) -> AdapterService {
        let env: Arc<dyn EnvSource> = Arc::new(self.env.clone());
        AdapterService::new(
            DetectorRegistry::with_default_detectors(Arc::clone(&env), Duration::from_millis(500)),
            AdapterRegistry::with_default_adapters(),
            BackupManager::new(&self.backup_dir),
            env,
        )
    }

    /// Absolute path of `relative` inside the home directory.
    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }

    /// Write a file below the home directory, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.home_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read a file below the home directory.
    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.home_path(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Whether `relative` exists below the home directory.
    pub fn exists(&self, relative: &str) -> bool {
        self.home_path(relative).exists()
    }

    /// Put an executable named `name` on the search path that prints
    /// `version` for `--version`.
    pub fn install_binary(&self, name: &str, version: &str) -> Result<PathBuf> {
        let path = self.bin_dir.join(name);
        fs::write(&path, format!("#!/bin/sh\necho \"{name} {version}\"\n"))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }
        Ok(path)
    }

    /// Backups taken for `client`, oldest first.
    pub fn backups_for(&self, client: ClientKind) -> Result<Vec<PathBuf>> {
        let dir = self.backup_dir.join(client.as_str());
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}
