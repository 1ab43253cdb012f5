//! Process environment access behind a trait so probes can be driven from
//! tests without touching the real environment.

use std::ffi::OsString;
use std::path::PathBuf;

/// Read-only view of the process environment.
///
/// Implementations must not cache: every call reflects the current state so
/// that a changed override takes effect on the next detection or mutation.
pub trait EnvSource: Send + Sync {
    /// Value of an environment variable, `None` when unset or not UTF-8.
    fn var(&self, name: &str) -> Option<String>;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The executable search path (`PATH`).
    fn search_path(&self) -> Option<OsString>;

    /// A trimmed, non-empty variable value. Blank values count as unset.
    fn non_empty_var(&self, name: &str) -> Option<String> {
        self.var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
}

/// [`EnvSource`] backed by the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn search_path(&self) -> Option<OsString> {
        std::env::var_os("PATH")
    }
}
