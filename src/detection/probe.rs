//! Filesystem and `PATH` probes.
//!
//! Probes are advisory reads with no side effects. A location resolves as
//! follows:
//!
//! 1. If the `(client, kind)` override variable holds a non-blank value, that
//!    exact path is checked and the result is final: [`LocationProbe::Found`],
//!    [`LocationProbe::OverridePermissionDenied`],
//!    [`LocationProbe::OverrideUnusable`] or [`LocationProbe::OverrideMissing`].
//! 2. Otherwise candidates are checked in priority order and the first path
//!    that exists wins. An existing but unreadable path is reported as
//!    [`LocationProbe::PermissionDenied`] instead of falling through, so a
//!    broken config is never mistaken for an absent one.

use crate::core::{ClientKind, EngineError, ResourceKind};
use crate::paths::{CandidateKind, ClientProfile, EnvSource, expand_path};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of a `PATH` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryProbe {
    /// First binary candidate found on the search path
    Found(PathBuf),
    /// None of the candidates is on the search path
    NotFound,
}

/// Outcome of resolving a config file or skills directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationProbe {
    /// Readable path
    Found {
        /// Resolved path
        path: PathBuf,
        /// Whether the override variable supplied it
        via_override: bool,
    },
    /// Override set to a path that does not exist
    OverrideMissing {
        /// Expanded override value
        path: PathBuf,
        /// Variable that was set
        env_var: &'static str,
    },
    /// Override set to a path that exists but cannot serve as this location,
    /// e.g. a directory where a config file is expected
    OverrideUnusable {
        /// Expanded override value
        path: PathBuf,
        /// Variable that was set
        env_var: &'static str,
        /// What is wrong with the path
        reason: String,
    },
    /// Override set to a path the process may not read
    OverridePermissionDenied {
        /// Expanded override value
        path: PathBuf,
        /// Variable that was set
        env_var: &'static str,
    },
    /// A candidate exists but may not be read
    PermissionDenied {
        /// Candidate path
        path: PathBuf,
    },
    /// A candidate exists but probing failed for another reason
    Unreadable {
        /// Candidate path
        path: PathBuf,
        /// Failure description
        reason: String,
    },
    /// No override and no candidate exists
    NotFound,
}

impl LocationProbe {
    /// Resolved path, if any.
    #[must_use]
    pub fn found_path(&self) -> Option<&Path> {
        match self {
            Self::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Convert a probe that blocks access into the matching engine error.
    ///
    /// `Found`, the override outcomes and `NotFound` are not errors; callers
    /// decide what absence means for them.
    pub fn access_error(&self, client: ClientKind, kind: ResourceKind) -> Option<EngineError> {
        match self {
            Self::OverridePermissionDenied { path, .. } | Self::PermissionDenied { path } => {
                Some(EngineError::PermissionDenied {
                    operation: format!("reading {client} {} at", kind.label()),
                    path: path.clone(),
                })
            }
            Self::Unreadable { path, reason } => Some(EngineError::Io {
                operation: format!("probing {client} {} at", kind.label()),
                path: path.clone(),
                source: io::Error::other(reason.clone()),
            }),
            _ => None,
        }
    }
}

enum PathState {
    Readable,
    Missing,
    Denied,
    Failed(String),
}

fn check_path(path: &Path, kind: CandidateKind) -> PathState {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => return classify(&e),
    };

    let attempt = match kind {
        CandidateKind::McpConfig if metadata.is_dir() => {
            return PathState::Failed("expected a file but found a directory".to_string());
        }
        CandidateKind::McpConfig => fs::File::open(path).map(drop),
        CandidateKind::SkillsDir if !metadata.is_dir() => {
            return PathState::Failed("expected a directory but found a file".to_string());
        }
        CandidateKind::SkillsDir => fs::read_dir(path).map(drop),
    };

    match attempt {
        Ok(()) => PathState::Readable,
        Err(e) => classify(&e),
    }
}

fn classify(error: &io::Error) -> PathState {
    match error.kind() {
        io::ErrorKind::NotFound => PathState::Missing,
        io::ErrorKind::PermissionDenied => PathState::Denied,
        _ => PathState::Failed(error.to_string()),
    }
}

/// Resolve the first binary candidate on the environment's search path.
#[must_use]
pub fn probe_binary(binaries: &[&str], env: &dyn EnvSource) -> BinaryProbe {
    let Some(search_path) = env.search_path() else {
        return BinaryProbe::NotFound;
    };
    let cwd = env.home_dir().unwrap_or_default();

    for name in binaries {
        if let Ok(path) = which::which_in(name, Some(&search_path), &cwd) {
            debug!("Found binary '{}' at {}", name, path.display());
            return BinaryProbe::Found(path);
        }
    }
    BinaryProbe::NotFound
}

/// Resolve a client's config file or skills directory.
#[must_use]
pub fn probe_location(
    profile: &ClientProfile,
    kind: CandidateKind,
    env: &dyn EnvSource,
) -> LocationProbe {
    if let Some(env_var) = profile.override_env_var(kind) {
        if let Some(value) = env.non_empty_var(env_var) {
            let path = expand_path(&value, env);
            let outcome = match check_path(&path, kind) {
                PathState::Readable => LocationProbe::Found {
                    path,
                    via_override: true,
                },
                PathState::Denied => LocationProbe::OverridePermissionDenied { path, env_var },
                PathState::Missing => LocationProbe::OverrideMissing { path, env_var },
                PathState::Failed(reason) => LocationProbe::OverrideUnusable {
                    path,
                    env_var,
                    reason,
                },
            };
            debug!("{} {} override {}: {:?}", profile.kind, kind.label(), env_var, outcome);
            return outcome;
        }
    }

    for candidate in profile.candidates_for(kind) {
        let path = candidate.resolve(env);
        match check_path(&path, kind) {
            PathState::Missing => continue,
            PathState::Readable => {
                debug!("{} {} resolved to {}", profile.kind, kind.label(), path.display());
                return LocationProbe::Found {
                    path,
                    via_override: false,
                };
            }
            PathState::Denied => return LocationProbe::PermissionDenied { path },
            PathState::Failed(reason) => return LocationProbe::Unreadable { path, reason },
        }
    }

    LocationProbe::NotFound
}
