//! Common helpers for ai-manager integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use ai_manager::core::{ClientKind, MutationAction, ResourceKind};
use ai_manager::service::MutateRequest;
use ai_manager::test_utils::TestEnvironment;
use assert_cmd::Command;
use serde_json::{Value, json};

/// Payload for a stdio MCP server.
pub fn stdio_payload(command: &str, args: &[&str]) -> Value {
    json!({ "transport": { "command": command, "args": args } })
}

/// Payload for an SSE MCP server.
pub fn sse_payload(url: &str) -> Value {
    json!({ "transport": { "url": url } })
}

/// Minimal skill manifest with YAML frontmatter.
pub fn skill_manifest(name: &str, description: &str) -> String {
    format!("---\nname: {name}\ndescription: {description}\n---\n\n# {name}\n\nSteps go here.\n")
}

/// Build a mutation request.
pub fn mutation(
    client: ClientKind,
    kind: ResourceKind,
    action: MutationAction,
    target: &str,
    payload: Option<Value>,
) -> MutateRequest {
    MutateRequest {
        client,
        kind,
        action,
        target_id: target.to_string(),
        payload,
    }
}

/// The CLI binary, confined to the test environment.
///
/// The process environment is cleared so the real home directory and any
/// override variables of the developer machine never leak in.
pub fn cli(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("ai-manager").unwrap();
    cmd.env_clear()
        .env("HOME", &env.home)
        .env("PATH", &env.bin_dir)
        .env("AI_MANAGER_BACKUP_DIR", &env.backup_dir);
    cmd
}

/// Parse the JSON envelope a CLI run printed.
pub fn envelope(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is one JSON envelope")
}
