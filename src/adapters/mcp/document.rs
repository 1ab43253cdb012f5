//! Format-independent view of an MCP configuration document.

use super::payload::Transport;
use crate::core::{EngineError, EngineResult};
use crate::paths::McpFormat;
use std::path::Path;

/// Keys an entry uses to describe its transport. Replaced wholesale on update.
pub(crate) const TRANSPORT_KEYS: [&str; 5] = ["command", "args", "env", "url", "headers"];

/// One server entry as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryView {
    /// Well-formed entry
    Server {
        name: String,
        enabled: bool,
        transport: Transport,
    },
    /// Entry is not a map
    NotAMap(String),
    /// Entry has neither `command` nor `url`
    NoTransport(String),
}

/// State of the MCP section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SectionView {
    /// No section at all
    Missing,
    /// Section exists but is not a map
    Invalid,
    /// Entries in document order
    Entries(Vec<EntryView>),
}

/// Operations every MCP document format supports.
pub(crate) trait McpDocument {
    /// Key of the section holding servers.
    fn section_key(&self) -> &'static str;

    /// Parsed entries.
    fn section(&self) -> SectionView;

    /// Whether an entry named `name` exists (well-formed or not).
    fn contains(&self, name: &str) -> bool;

    /// Current enabled flag of an entry.
    fn enabled(&self, name: &str) -> Option<bool>;

    /// Insert or replace the transport and enabled flag of `name`, keeping
    /// every other key of the entry and the document.
    fn upsert(&mut self, name: &str, transport: &Transport, enabled: bool) -> Result<(), String>;

    /// Delete `name`. Returns whether it existed.
    fn remove(&mut self, name: &str) -> bool;

    /// Serialize the whole document.
    fn render(&self) -> Result<String, String>;
}

/// Parse `content` as a document of `format`.
pub(crate) fn parse_document(
    format: McpFormat,
    path: &Path,
    content: &str,
) -> EngineResult<Box<dyn McpDocument>> {
    let parsed: Result<Box<dyn McpDocument>, String> = match format {
        McpFormat::Json => super::json_doc::JsonDocument::parse(content)
            .map(|doc| Box::new(doc) as Box<dyn McpDocument>),
        McpFormat::Toml => super::toml_doc::TomlDocument::parse(content)
            .map(|doc| Box::new(doc) as Box<dyn McpDocument>),
    };
    parsed.map_err(|reason| EngineError::Parse {
        path: path.to_path_buf(),
        format: format.name(),
        reason,
    })
}

/// `enabled` wins over `disabled`; entries default to enabled.
pub(crate) fn effective_enabled(enabled: Option<bool>, disabled: Option<bool>) -> bool {
    enabled.or(disabled.map(|d| !d)).unwrap_or(true)
}

/// Pick the transport an entry describes. `command` wins over `url`.
pub(crate) fn transport_from_parts(
    command: Option<String>,
    args: Vec<String>,
    env: std::collections::BTreeMap<String, String>,
    url: Option<String>,
    headers: std::collections::BTreeMap<String, String>,
) -> Option<Transport> {
    match (command, url) {
        (Some(command), _) => Some(Transport::Stdio { command, args, env }),
        (None, Some(url)) => Some(Transport::Sse { url, headers }),
        (None, None) => None,
    }
}
