//! In-memory [`EnvSource`] for tests.

use crate::paths::EnvSource;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct MapEnvState {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
    search_path: Option<OsString>,
}

/// Environment backed by a shared map.
///
/// Clones share state, so a test can hand one clone to a service and change
/// overrides through another between calls.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    state: Arc<RwLock<MapEnvState>>,
}

impl MapEnv {
    /// Empty environment: no variables, no home, no `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MapEnv::set_home`].
    #[must_use]
    pub fn with_home(self, home: impl AsRef<Path>) -> Self {
        self.set_home(home);
        self
    }

    /// Builder form of [`MapEnv::set_search_path`].
    #[must_use]
    pub fn with_search_path(self, dirs: &[&Path]) -> Self {
        self.set_search_path(dirs);
        self
    }

    /// Builder form of [`MapEnv::set_var`].
    #[must_use]
    pub fn with_var(self, name: &str, value: impl Into<String>) -> Self {
        self.set_var(name, value);
        self
    }

    /// Set the home directory.
    pub fn set_home(&self, home: impl AsRef<Path>) {
        self.write().home = Some(home.as_ref().to_path_buf());
    }

    /// Replace `PATH` with the given directories.
    pub fn set_search_path(&self, dirs: &[&Path]) {
        let joined = std::env::join_paths(dirs).unwrap_or_default();
        self.write().search_path = Some(joined);
    }

    /// Set a variable.
    pub fn set_var(&self, name: &str, value: impl Into<String>) {
        self.write().vars.insert(name.to_string(), value.into());
    }

    /// Unset a variable.
    pub fn remove_var(&self, name: &str) {
        self.write().vars.remove(name);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MapEnvState> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MapEnvState> {
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.read().vars.get(name).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.read().home.clone()
    }

    fn search_path(&self) -> Option<OsString> {
        self.read().search_path.clone()
    }
}
