use crate::common::{mutation, sse_payload, stdio_payload};
use ai_manager::core::{ClientKind, ErrorCategory, MutationAction, ResourceKind};
use ai_manager::service::ListRequest;
use ai_manager::test_utils::TestEnvironment;
use serde_json::{Value, json};
use std::fs;

const CURSOR_CONFIG: &str = ".cursor/mcp.json";

fn seeded() -> (TestEnvironment, String) {
    let env = TestEnvironment::new().unwrap();
    let document = json!({
        "theme": "dark",
        "mcpServers": {
            "filesystem": {
                "command": "npx",
                "args": ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"],
                "env": { "DEBUG": "1" }
            }
        }
    });
    let content = format!("{}\n", serde_json::to_string_pretty(&document).unwrap());
    env.write_file(CURSOR_CONFIG, &content).unwrap();
    (env, content)
}

#[tokio::test]
async fn test_add_keeps_unrelated_entries_byte_for_byte() {
    let (env, original) = seeded();
    let service = env.service();

    let response = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &["-y", "@modelcontextprotocol/server-github"])),
        ))
        .await
        .unwrap();

    assert!(response.accepted);
    assert_eq!(response.source_path, env.home_path(CURSOR_CONFIG));
    assert!(response.message.starts_with("Added MCP server 'github'"));

    let updated = env.read_file(CURSOR_CONFIG).unwrap();
    let original_block = original
        .split("\"filesystem\"")
        .nth(1)
        .and_then(|rest| rest.split("\n    }").next())
        .unwrap();
    assert!(updated.contains(original_block));

    let value: Value = serde_json::from_str(&updated).unwrap();
    assert_eq!(value["theme"], "dark");
    assert_eq!(value["mcpServers"]["github"]["command"], "npx");
    assert_eq!(value["mcpServers"]["github"]["args"][1], "@modelcontextprotocol/server-github");
    let original_value: Value = serde_json::from_str(&original).unwrap();
    assert_eq!(value["mcpServers"]["filesystem"], original_value["mcpServers"]["filesystem"]);
}

#[tokio::test]
async fn test_duplicate_add_fails_and_leaves_file_untouched() {
    let (env, original) = seeded();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Add,
            "filesystem",
            Some(stdio_payload("node", &["server.js"])),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.to_string().contains("MCP server 'filesystem' already exists in"));
    assert_eq!(env.read_file(CURSOR_CONFIG).unwrap(), original);
    assert!(env.backups_for(ClientKind::Cursor).unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_remove_of_missing_entry_fail() {
    let (env, original) = seeded();
    let service = env.service();

    for action in [MutationAction::Update, MutationAction::Remove] {
        let err = service
            .mutate_resource(mutation(
                ClientKind::Cursor,
                ResourceKind::Mcp,
                action,
                "ghost",
                Some(stdio_payload("npx", &[])),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation, "{action}");
        assert!(err.to_string().contains("does not exist"));
    }
    assert_eq!(env.read_file(CURSOR_CONFIG).unwrap(), original);
}

#[tokio::test]
async fn test_remove_takes_exactly_one_backup_of_previous_content() {
    let (env, original) = seeded();
    let service = env.service();

    let response = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Remove,
            "filesystem",
            None,
        ))
        .await
        .unwrap();

    let backups = env.backups_for(ClientKind::Cursor).unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), original);
    assert_eq!(response.backup_path.as_deref(), Some(backups[0].as_path()));
    assert!(response.message.contains("Backup: "));

    let value: Value = serde_json::from_str(&env.read_file(CURSOR_CONFIG).unwrap()).unwrap();
    assert!(value["mcpServers"].get("filesystem").is_none());
    assert_eq!(value["theme"], "dark");
}

#[tokio::test]
async fn test_update_switches_transport_and_keeps_enabled_flag() {
    let (env, _) = seeded();
    let service = env.service();

    service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Update,
            "filesystem",
            Some(sse_payload("https://mcp.example.com/sse")),
        ))
        .await
        .unwrap();

    let value: Value = serde_json::from_str(&env.read_file(CURSOR_CONFIG).unwrap()).unwrap();
    let entry = &value["mcpServers"]["filesystem"];
    assert_eq!(entry["url"], "https://mcp.example.com/sse");
    assert!(entry.get("command").is_none());
    assert!(entry.get("args").is_none());

    let listing = service
        .list_resources(ListRequest {
            client: Some(ClientKind::Cursor),
            kind: ResourceKind::Mcp,
            enabled: None,
        })
        .await
        .unwrap();
    assert_eq!(listing.items.len(), 1);
    assert!(listing.items[0].enabled);
    assert_eq!(listing.items[0].transport_url.as_deref(), Some("https://mcp.example.com/sse"));
}

#[tokio::test]
async fn test_add_creates_missing_config_at_happy_path() {
    let env = TestEnvironment::new().unwrap();
    let service = env.service();

    let response = service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &["-y", "@modelcontextprotocol/server-github"])),
        ))
        .await
        .unwrap();

    let expected = env.home_path(".claude/claude_code_config.json");
    assert_eq!(response.source_path, expected);
    assert!(response.backup_path.is_none());
    assert!(response.message.ends_with('.'));
    assert!(!response.message.contains("Backup"));

    let value: Value = serde_json::from_str(&env.read_file(".claude/claude_code_config.json").unwrap()).unwrap();
    assert_eq!(value["mcpServers"]["github"]["command"], "npx");
    assert!(env.backups_for(ClientKind::ClaudeCode).unwrap().is_empty());
}

#[tokio::test]
async fn test_explicit_source_path_overrides_inference() {
    let (env, original) = seeded();
    let custom = env.write_file("work/mcp.json", "{}\n").unwrap();
    let service = env.service();

    let mut payload = stdio_payload("uvx", &["mcp-server-git"]);
    payload["source_path"] = json!(custom.to_string_lossy());
    service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Add,
            "git",
            Some(payload),
        ))
        .await
        .unwrap();

    let value: Value = serde_json::from_str(&fs::read_to_string(&custom).unwrap()).unwrap();
    assert_eq!(value["mcpServers"]["git"]["command"], "uvx");
    assert_eq!(env.read_file(CURSOR_CONFIG).unwrap(), original);
}

#[tokio::test]
async fn test_malformed_document_is_a_parse_error() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(CURSOR_CONFIG, "{ \"mcpServers\": { ").unwrap();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &[])),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(!err.is_recoverable());
    assert_eq!(env.read_file(CURSOR_CONFIG).unwrap(), "{ \"mcpServers\": { ");
}

#[tokio::test]
async fn test_invalid_payload_is_rejected_before_any_write() {
    let (env, original) = seeded();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Add,
            "broken",
            Some(json!({ "transport": { "command": "npx", "url": "https://x" } })),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(env.read_file(CURSOR_CONFIG).unwrap(), original);
}
