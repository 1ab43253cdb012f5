//! Identifiers shared by every layer: which client, which kind of resource,
//! which mutation.

use crate::core::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported AI coding-assistant clients.
///
/// Used as a map key everywhere (registries, locks, backup sub-directories).
/// Serialized in `snake_case`, which is also the form accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    /// Claude Code command-line client
    ClaudeCode,
    /// Codex command-line client
    CodexCli,
    /// Cursor desktop editor
    Cursor,
    /// Codex desktop application
    CodexApp,
}

impl ClientKind {
    /// Every client, in registry order.
    pub const ALL: [Self; 4] = [Self::ClaudeCode, Self::CodexCli, Self::Cursor, Self::CodexApp];

    /// Stable `snake_case` key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude_code",
            Self::CodexCli => "codex_cli",
            Self::Cursor => "cursor",
            Self::CodexApp => "codex_app",
        }
    }

    /// Upper-cased key used inside environment variable names (`CODEX_CLI`).
    #[must_use]
    pub fn env_segment(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|kind| kind.as_str() == normalized).ok_or_else(|| {
            EngineError::UnsupportedValue {
                field: "client",
                value: s.to_string(),
                expected: Self::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", "),
            }
        })
    }
}

/// Kind of configuration entry an adapter manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// MCP server registration inside a client config document
    Mcp,
    /// Skill manifest stored as a directory or single markdown file
    Skill,
}

impl ResourceKind {
    /// Both kinds, in listing order.
    pub const ALL: [Self; 2] = [Self::Mcp, Self::Skill];

    /// Stable key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::Skill => "skill",
        }
    }

    /// Human label used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mcp => "MCP server",
            Self::Skill => "skill",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcp" => Ok(Self::Mcp),
            "skill" | "skills" => Ok(Self::Skill),
            _ => Err(EngineError::UnsupportedValue {
                field: "resource kind",
                value: s.to_string(),
                expected: "mcp, skill".to_string(),
            }),
        }
    }
}

/// A single structural change applied to one `target_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    /// Create an entry; fails if it already exists
    Add,
    /// Delete an entry; fails if it does not exist
    Remove,
    /// Replace an entry; fails if it does not exist
    Update,
}

impl MutationAction {
    /// Stable key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }

    /// Past-tense verb for confirmation messages.
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Add => "Added",
            Self::Remove => "Removed",
            Self::Update => "Updated",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationAction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "update" => Ok(Self::Update),
            _ => Err(EngineError::UnsupportedValue {
                field: "action",
                value: s.to_string(),
                expected: "add, remove, update".to_string(),
            }),
        }
    }
}
