//! Where each client keeps its binary, MCP config and skills.
//!
//! The [`table`] module holds one static [`ClientProfile`] per client. Both
//! detection and mutation resolve locations from the same rows, so a path
//! that detection reports is the path a mutation will write.
//!
//! Templates may start with `~/`, which [`expand_path`] resolves against the
//! injected [`EnvSource`]'s home directory.

pub mod env;
pub mod table;

pub use env::{EnvSource, SystemEnv};
pub use table::{CLIENT_PROFILES, profile};

use crate::core::ClientKind;
use std::path::PathBuf;

/// What a candidate path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// MCP server configuration document
    McpConfig,
    /// Directory holding skill manifests
    SkillsDir,
}

impl CandidateKind {
    /// Label used in notes and warnings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::McpConfig => "MCP config",
            Self::SkillsDir => "skills directory",
        }
    }
}

/// Whether the candidate is the conventional location or a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateRole {
    /// Conventional location; new files are created here
    HappyPath,
    /// Probed only when the happy path does not exist
    Fallback,
}

/// How a client is distributed, which shapes detection notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    /// Command-line tool expected on `PATH`
    Cli,
    /// Desktop application, possibly with a launcher on `PATH`
    Desktop,
}

/// On-disk format of a client's MCP configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpFormat {
    /// JSON document with an `mcpServers` object
    Json,
    /// TOML document with an `[mcp_servers]` table
    Toml,
}

impl McpFormat {
    /// Format name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }

    /// Section keys in lookup order; the first is used for new documents.
    #[must_use]
    pub const fn section_keys(self) -> [&'static str; 2] {
        match self {
            Self::Json => ["mcpServers", "mcp_servers"],
            Self::Toml => ["mcp_servers", "mcpServers"],
        }
    }
}

/// One row of the Path Candidate Table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCandidate {
    /// What the path points at
    pub kind: CandidateKind,
    /// Happy path or fallback
    pub role: CandidateRole,
    /// 1-based probe order within `(client, kind)`
    pub priority: u8,
    /// Path, optionally starting with `~/`
    pub path_template: &'static str,
    /// Variable that overrides every candidate of this `(client, kind)`
    pub override_env_var: &'static str,
}

impl PathCandidate {
    /// Expand the template against the given environment.
    #[must_use]
    pub fn resolve(&self, env: &dyn EnvSource) -> PathBuf {
        expand_path(self.path_template, env)
    }
}

/// Static description of one client.
#[derive(Debug)]
pub struct ClientProfile {
    /// Client identifier
    pub kind: ClientKind,
    /// Human-readable name
    pub display_name: &'static str,
    /// CLI tool or desktop application
    pub detector_kind: DetectorKind,
    /// Binary names probed on `PATH`, in order
    pub binaries: &'static [&'static str],
    /// MCP configuration format
    pub mcp_format: McpFormat,
    /// Config and skills locations
    pub candidates: &'static [PathCandidate],
}

impl ClientProfile {
    /// Candidates of one kind, ordered by priority.
    #[must_use]
    pub fn candidates_for(&self, kind: CandidateKind) -> Vec<&'static PathCandidate> {
        let mut group: Vec<&'static PathCandidate> =
            self.candidates.iter().filter(|c| c.kind == kind).collect();
        group.sort_by_key(|c| c.priority);
        group
    }

    /// Conventional location for `kind`.
    #[must_use]
    pub fn happy_path(&self, kind: CandidateKind) -> Option<&'static PathCandidate> {
        self.candidates.iter().find(|c| c.kind == kind && c.role == CandidateRole::HappyPath)
    }

    /// Override variable for `kind`.
    #[must_use]
    pub fn override_env_var(&self, kind: CandidateKind) -> Option<&'static str> {
        self.candidates.iter().find(|c| c.kind == kind).map(|c| c.override_env_var)
    }
}

/// Expand a leading `~` against the environment's home directory.
///
/// Paths without a tilde, or an environment without a home directory, are
/// returned unchanged.
#[must_use]
pub fn expand_path(template: &str, env: &dyn EnvSource) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(template, || {
        env.home_dir().map(|home| home.to_string_lossy().into_owned())
    });
    PathBuf::from(expanded.as_ref())
}
