//! JSON MCP documents (`{"mcpServers": {...}}`).
//!
//! Key order of the whole document is preserved and output is pretty-printed
//! with a trailing newline, so entries the mutation does not touch keep their
//! exact text when the file was already in that layout.

use super::document::{
    EntryView, McpDocument, SectionView, TRANSPORT_KEYS, effective_enabled, transport_from_parts,
};
use super::payload::Transport;
use crate::paths::McpFormat;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub(crate) struct JsonDocument {
    root: Map<String, Value>,
    section_key: &'static str,
}

impl JsonDocument {
    pub(crate) fn parse(content: &str) -> Result<Self, String> {
        let root = if content.trim().is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(content).map_err(|e| e.to_string())? {
                Value::Object(map) => map,
                other => {
                    return Err(format!(
                        "top-level value must be an object, found {}",
                        json_type(&other)
                    ));
                }
            }
        };

        let keys = McpFormat::Json.section_keys();
        let section_key = keys.into_iter().find(|k| root.contains_key(*k)).unwrap_or(keys[0]);
        Ok(Self { root, section_key })
    }

    fn servers(&self) -> Option<&Map<String, Value>> {
        self.root.get(self.section_key).and_then(Value::as_object)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn entry_view(name: &str, value: &Value) -> EntryView {
    let Some(entry) = value.as_object() else {
        return EntryView::NotAMap(name.to_string());
    };
    let text = |key: &str| entry.get(key).and_then(Value::as_str).map(ToString::to_string);
    let args = entry
        .get("args")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|a| a.as_str().map(ToString::to_string)).collect())
        .unwrap_or_default();

    match transport_from_parts(
        text("command"),
        args,
        string_map(entry.get("env")),
        text("url"),
        string_map(entry.get("headers")),
    ) {
        Some(transport) => EntryView::Server {
            name: name.to_string(),
            enabled: effective_enabled(
                entry.get("enabled").and_then(Value::as_bool),
                entry.get("disabled").and_then(Value::as_bool),
            ),
            transport,
        },
        None => EntryView::NoTransport(name.to_string()),
    }
}

fn string_map_value(map: &BTreeMap<String, String>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect())
}

fn write_entry(entry: &mut Map<String, Value>, transport: &Transport, enabled: bool) {
    let mut fields: Vec<(&str, Value)> = Vec::new();
    match transport {
        Transport::Stdio { command, args, env } => {
            fields.push(("command", Value::String(command.clone())));
            if !args.is_empty() {
                fields.push(("args", Value::from(args.clone())));
            }
            if !env.is_empty() {
                fields.push(("env", string_map_value(env)));
            }
        }
        Transport::Sse { url, headers } => {
            fields.push(("url", Value::String(url.clone())));
            if !headers.is_empty() {
                fields.push(("headers", string_map_value(headers)));
            }
        }
    }

    for key in TRANSPORT_KEYS {
        if !fields.iter().any(|(k, _)| *k == key) {
            entry.shift_remove(key);
        }
    }
    if entry.contains_key("type") {
        let kind = match transport {
            Transport::Stdio { .. } => "stdio",
            Transport::Sse { .. } => "sse",
        };
        entry.insert("type".to_string(), Value::String(kind.to_string()));
    }
    for (key, value) in fields {
        entry.insert(key.to_string(), value);
    }
    if entry.contains_key("disabled") {
        entry.insert("disabled".to_string(), Value::Bool(!enabled));
    }
    entry.insert("enabled".to_string(), Value::Bool(enabled));
}

impl McpDocument for JsonDocument {
    fn section_key(&self) -> &'static str {
        self.section_key
    }

    fn section(&self) -> SectionView {
        match self.root.get(self.section_key) {
            None => SectionView::Missing,
            Some(Value::Object(servers)) => {
                SectionView::Entries(servers.iter().map(|(name, v)| entry_view(name, v)).collect())
            }
            Some(_) => SectionView::Invalid,
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.servers().is_some_and(|servers| servers.contains_key(name))
    }

    fn enabled(&self, name: &str) -> Option<bool> {
        let entry = self.servers()?.get(name)?.as_object()?;
        Some(effective_enabled(
            entry.get("enabled").and_then(Value::as_bool),
            entry.get("disabled").and_then(Value::as_bool),
        ))
    }

    fn upsert(&mut self, name: &str, transport: &Transport, enabled: bool) -> Result<(), String> {
        let key = self.section_key;
        let servers = self
            .root
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| format!("`{key}` must be an object"))?;

        let entry = servers.entry(name.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Some(map) = entry.as_object_mut() {
            write_entry(map, transport, enabled);
        }
        Ok(())
    }

    fn remove(&mut self, name: &str) -> bool {
        self.root
            .get_mut(self.section_key)
            .and_then(Value::as_object_mut)
            .is_some_and(|servers| servers.shift_remove(name).is_some())
    }

    fn render(&self) -> Result<String, String> {
        let mut rendered =
            serde_json::to_string_pretty(&self.root).map_err(|e| e.to_string())?;
        rendered.push('\n');
        Ok(rendered)
    }
}
