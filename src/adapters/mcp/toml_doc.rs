//! TOML MCP documents (`[mcp_servers.<name>]`).
//!
//! Edited through [`toml_edit::DocumentMut`] so comments, whitespace and
//! unrelated tables survive a mutation untouched.

use super::document::{
    EntryView, McpDocument, SectionView, TRANSPORT_KEYS, effective_enabled, transport_from_parts,
};
use super::payload::Transport;
use crate::paths::McpFormat;
use std::collections::BTreeMap;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table, TableLike, Value, value};

pub(crate) struct TomlDocument {
    doc: DocumentMut,
    section_key: &'static str,
}

impl TomlDocument {
    pub(crate) fn parse(content: &str) -> Result<Self, String> {
        let doc = content.parse::<DocumentMut>().map_err(|e| e.to_string().trim().to_string())?;
        let keys = McpFormat::Toml.section_keys();
        let section_key = keys
            .into_iter()
            .find(|k| doc.as_table().contains_key(k))
            .unwrap_or(keys[0]);
        Ok(Self { doc, section_key })
    }

    fn servers(&self) -> Option<&dyn TableLike> {
        self.doc.as_table().get(self.section_key).and_then(Item::as_table_like)
    }
}

fn string_map(item: Option<&Item>) -> BTreeMap<String, String> {
    item.and_then(Item::as_table_like)
        .map(|table| {
            table
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.to_string(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn entry_enabled(entry: &dyn TableLike) -> bool {
    effective_enabled(
        entry.get("enabled").and_then(Item::as_bool),
        entry.get("disabled").and_then(Item::as_bool),
    )
}

fn entry_view(name: &str, item: &Item) -> EntryView {
    let Some(entry) = item.as_table_like() else {
        return EntryView::NotAMap(name.to_string());
    };
    let text = |key: &str| entry.get(key).and_then(Item::as_str).map(ToString::to_string);
    let args = entry
        .get("args")
        .and_then(Item::as_array)
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
            enabled: entry_enabled(entry),
            transport,
        },
        None => EntryView::NoTransport(name.to_string()),
    }
}

fn inline_map(map: &BTreeMap<String, String>) -> Item {
    let mut table = InlineTable::new();
    for (k, v) in map {
        table.insert(k.as_str(), Value::from(v.as_str()));
    }
    value(table)
}

fn write_entry(entry: &mut dyn TableLike, transport: &Transport, enabled: bool) {
    let mut fields: Vec<(&str, Item)> = Vec::new();
    match transport {
        Transport::Stdio { command, args, env } => {
            fields.push(("command", value(command.as_str())));
            if !args.is_empty() {
                let mut array = Array::new();
                for arg in args {
                    array.push(arg.as_str());
                }
                fields.push(("args", value(array)));
            }
            if !env.is_empty() {
                fields.push(("env", inline_map(env)));
            }
        }
        Transport::Sse { url, headers } => {
            fields.push(("url", value(url.as_str())));
            if !headers.is_empty() {
                fields.push(("headers", inline_map(headers)));
            }
        }
    }

    for key in TRANSPORT_KEYS {
        if !fields.iter().any(|(k, _)| *k == key) {
            entry.remove(key);
        }
    }
    if entry.contains_key("type") {
        let kind = match transport {
            Transport::Stdio { .. } => "stdio",
            Transport::Sse { .. } => "sse",
        };
        entry.insert("type", value(kind));
    }
    for (key, item) in fields {
        entry.insert(key, item);
    }
    if entry.contains_key("disabled") {
        entry.insert("disabled", value(!enabled));
    }
    entry.insert("enabled", value(enabled));
}

impl McpDocument for TomlDocument {
    fn section_key(&self) -> &'static str {
        self.section_key
    }

    fn section(&self) -> SectionView {
        match self.doc.as_table().get(self.section_key) {
            None => SectionView::Missing,
            Some(item) => match item.as_table_like() {
                Some(servers) => SectionView::Entries(
                    servers.iter().map(|(name, item)| entry_view(name, item)).collect(),
                ),
                None => SectionView::Invalid,
            },
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.servers().is_some_and(|servers| servers.contains_key(name))
    }

    fn enabled(&self, name: &str) -> Option<bool> {
        let entry = self.servers()?.get(name)?.as_table_like()?;
        Some(entry_enabled(entry))
    }

    fn upsert(&mut self, name: &str, transport: &Transport, enabled: bool) -> Result<(), String> {
        let key = self.section_key;
        let root = self.doc.as_table_mut();
        if !root.contains_key(key) {
            let mut section = Table::new();
            section.set_implicit(true);
            root.insert(key, Item::Table(section));
        }

        let section_item = root.get_mut(key).ok_or_else(|| format!("`{key}` is missing"))?;
        let inline_parent = section_item.is_inline_table();
        let servers = section_item
            .as_table_like_mut()
            .ok_or_else(|| format!("`{key}` must be a table"))?;

        if let Some(entry) = servers.get_mut(name).and_then(Item::as_table_like_mut) {
            write_entry(entry, transport, enabled);
            return Ok(());
        }

        let mut table = Table::new();
        write_entry(&mut table, transport, enabled);
        let item = if inline_parent {
            value(table.into_inline_table())
        } else {
            Item::Table(table)
        };
        servers.insert(name, item);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> bool {
        self.doc
            .as_table_mut()
            .get_mut(self.section_key)
            .and_then(Item::as_table_like_mut)
            .is_some_and(|servers| servers.remove(name).is_some())
    }

    fn render(&self) -> Result<String, String> {
        Ok(self.doc.to_string())
    }
}
