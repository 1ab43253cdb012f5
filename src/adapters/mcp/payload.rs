//! MCP mutation payloads.
//!
//! ```json
//! {
//!   "source_path": "~/.cursor/mcp.json",
//!   "enabled": true,
//!   "transport": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-github"] }
//! }
//! ```
//!
//! `transport` holds either `command` (stdio, with optional `args` and `env`)
//! or `url` (sse, with optional `headers`), never both.

use crate::core::{EngineError, EngineResult, MutationAction, ResourceKind, TransportKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// How the client reaches the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Local process
    Stdio {
        /// Executable
        command: String,
        /// Arguments
        args: Vec<String>,
        /// Extra environment
        env: BTreeMap<String, String>,
    },
    /// Remote endpoint
    Sse {
        /// `http://` or `https://` URL
        url: String,
        /// Extra request headers
        headers: BTreeMap<String, String>,
    },
}

impl Transport {
    /// Kind of this transport.
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Stdio { .. } => TransportKind::Stdio,
            Self::Sse { .. } => TransportKind::Sse,
        }
    }
}

/// Validated MCP payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McpPayload {
    /// Explicit config file, overriding path inference
    pub source_path: Option<String>,
    /// Requested enabled flag; `None` keeps the current value on update
    pub enabled: Option<bool>,
    /// Present for add and update
    pub transport: Option<Transport>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPayload {
    source_path: Option<String>,
    enabled: Option<bool>,
    transport: Option<RawTransport>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTransport {
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    url: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl McpPayload {
    /// Parse and validate the payload for `action` on server `name`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the payload is not an object of the
    /// expected shape, when add/update lack a transport, or when the
    /// transport is ambiguous or malformed.
    pub fn parse(
        action: MutationAction,
        name: &str,
        payload: Option<&serde_json::Value>,
    ) -> EngineResult<Self> {
        let raw: RawPayload = match payload {
            None | Some(serde_json::Value::Null) => RawPayload::default(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| EngineError::invalid(ResourceKind::Mcp, name, format!("payload: {e}")))?,
        };

        let source_path = raw
            .source_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        if action == MutationAction::Remove {
            if raw.transport.is_some() || raw.enabled.is_some() {
                debug!("Ignoring transport/enabled in remove payload for '{}'", name);
            }
            return Ok(Self {
                source_path,
                enabled: None,
                transport: None,
            });
        }

        let transport = raw.transport.ok_or_else(|| {
            EngineError::invalid(ResourceKind::Mcp, name, format!("transport is required for {action}"))
        })?;

        Ok(Self {
            source_path,
            enabled: raw.enabled,
            transport: Some(validate_transport(name, transport)?),
        })
    }
}

fn validate_transport(name: &str, raw: RawTransport) -> EngineResult<Transport> {
    let invalid = |reason: &str| EngineError::invalid(ResourceKind::Mcp, name, reason);

    let command = raw.command.map(|c| c.trim().to_string());
    let url = raw.url.map(|u| u.trim().to_string());

    match (command, url) {
        (Some(_), Some(_)) => Err(invalid("transport must set either `command` or `url`, not both")),
        (None, None) => Err(invalid("transport must set `command` (stdio) or `url` (sse)")),
        (Some(command), None) => {
            if command.is_empty() {
                return Err(invalid("transport `command` must not be empty"));
            }
            if !raw.headers.is_empty() {
                return Err(invalid("`headers` only applies to url transports"));
            }
            Ok(Transport::Stdio {
                command,
                args: raw.args,
                env: raw.env,
            })
        }
        (None, Some(url)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("transport `url` must start with http:// or https://"));
            }
            if !raw.args.is_empty() || !raw.env.is_empty() {
                return Err(invalid("`args` and `env` only apply to command transports"));
            }
            Ok(Transport::Sse {
                url,
                headers: raw.headers,
            })
        }
    }
}
