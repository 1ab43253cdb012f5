use crate::common::{mutation, skill_manifest, stdio_payload};
use ai_manager::backup::FaultInjection;
use ai_manager::core::{ClientKind, EngineError, ErrorCategory, MutationAction, ResourceKind};
use ai_manager::test_utils::TestEnvironment;
use serde_json::json;
use std::fs;

const SEED: &str = "{\n  \"mcpServers\": {\n    \"keep\": {\n      \"command\": \"node\"\n    }\n  }\n}\n";

fn after_write() -> FaultInjection {
    FaultInjection {
        fail_after_write: true,
        ..FaultInjection::default()
    }
}

#[tokio::test]
async fn test_failure_after_write_restores_exact_bytes() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".cursor/mcp.json", SEED).unwrap();
    let service = env.service().with_fault_injection(after_write());

    let err = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &["-y", "@modelcontextprotocol/server-github"])),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Io);
    assert!(err.is_recoverable());
    match &err {
        EngineError::RolledBack { restored, .. } => assert!(*restored),
        other => panic!("expected a rolled back error, got {other:?}"),
    }
    assert_eq!(env.read_file(".cursor/mcp.json").unwrap(), SEED);

    let backups = env.backups_for(ClientKind::Cursor).unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(err.backup_path(), Some(backups[0].as_path()));
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), SEED);
}

#[tokio::test]
async fn test_failure_after_backup_never_writes() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".codex/config.toml", "model = \"o3\"\n").unwrap();
    let service = env.service().with_fault_injection(FaultInjection {
        fail_after_backup: true,
        ..FaultInjection::default()
    });

    service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &[])),
        ))
        .await
        .unwrap_err();

    assert_eq!(env.read_file(".codex/config.toml").unwrap(), "model = \"o3\"\n");
}

#[tokio::test]
async fn test_failed_create_leaves_nothing_behind() {
    let env = TestEnvironment::new().unwrap();
    let service = env.service().with_fault_injection(after_write());

    let err = service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &[])),
        ))
        .await
        .unwrap_err();

    assert!(err.backup_path().is_none());
    assert!(!env.exists(".claude/claude_code_config.json"));
    assert!(!env.exists(".claude"));
    assert!(env.backups_for(ClientKind::ClaudeCode).unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_skill_removal_restores_the_directory() {
    let env = TestEnvironment::new().unwrap();
    let manifest = skill_manifest("docs", "Write docs");
    env.write_file(".claude/skills/docs/SKILL.md", &manifest).unwrap();
    env.write_file(".claude/skills/docs/template.md", "# Title\n").unwrap();
    let service = env.service().with_fault_injection(after_write());

    service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Skill,
            MutationAction::Remove,
            "docs",
            None,
        ))
        .await
        .unwrap_err();

    assert_eq!(env.read_file(".claude/skills/docs/SKILL.md").unwrap(), manifest);
    assert_eq!(env.read_file(".claude/skills/docs/template.md").unwrap(), "# Title\n");
}

#[tokio::test]
async fn test_failed_skill_add_removes_partial_install() {
    let env = TestEnvironment::new().unwrap();
    let service = env.service().with_fault_injection(after_write());

    service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Skill,
            MutationAction::Add,
            "fresh",
            Some(json!({ "manifest": skill_manifest("fresh", "New") })),
        ))
        .await
        .unwrap_err();

    assert!(!env.exists(".cursor/skills/fresh"));
}
