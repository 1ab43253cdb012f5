//! Parsed configuration entries as returned by list operations.

use crate::core::client::ClientKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How an MCP server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Local process started from `command` + `args`
    Stdio,
    /// Remote endpoint at `url`
    Sse,
}

/// On-disk layout of an installed skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallKind {
    /// `<skills_dir>/<name>/SKILL.md`
    Directory,
    /// `<skills_dir>/<name>.md`
    File,
}

impl InstallKind {
    /// Stable key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
        }
    }
}

/// One entry inside a client's configuration after an adapter parsed it.
///
/// `id` is only stable within a single listing; `display_name` is the key
/// callers pass back as `target_id` when mutating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// `<client>::<name>` for MCP, `<client>::skill::<name>` for skills
    pub id: String,
    /// Owning client
    pub client: ClientKind,
    /// Entry name
    pub display_name: String,
    /// Whether the client will load the entry
    pub enabled: bool,
    /// MCP only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_kind: Option<TransportKind>,
    /// MCP stdio command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_command: Option<String>,
    /// MCP stdio arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transport_args: Vec<String>,
    /// MCP remote endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_url: Option<String>,
    /// File or directory the entry was read from
    pub source_path: PathBuf,
    /// Skill description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Skill only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_kind: Option<InstallKind>,
}

impl ResourceRecord {
    /// Listing id of an MCP server entry.
    #[must_use]
    pub fn mcp_id(client: ClientKind, name: &str) -> String {
        format!("{}::{name}", client.as_str())
    }

    /// Listing id of a skill.
    #[must_use]
    pub fn skill_id(client: ClientKind, name: &str) -> String {
        format!("{}::skill::{name}", client.as_str())
    }
}
