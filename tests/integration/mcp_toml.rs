use crate::common::{mutation, sse_payload, stdio_payload};
use ai_manager::core::{ClientKind, ErrorCategory, MutationAction, ResourceKind, TransportKind};
use ai_manager::service::ListRequest;
use ai_manager::test_utils::TestEnvironment;
use serde_json::json;

const CODEX_CONFIG: &str = ".codex/config.toml";

const SEED: &str = r#"# Codex settings
model = "o3"
approval_policy = "on-request"

[mcp_servers.docs]
# local docs server
command = "uvx"
args = ["mcp-docs", "--root", "~/docs"]
enabled = false

[profiles.fast]
model = "o4-mini"
"#;

fn seeded() -> TestEnvironment {
    let env = TestEnvironment::new().unwrap();
    env.write_file(CODEX_CONFIG, SEED).unwrap();
    env
}

#[tokio::test]
async fn test_add_preserves_comments_and_unrelated_tables() {
    let env = seeded();
    let service = env.service();

    service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &["-y", "@modelcontextprotocol/server-github"])),
        ))
        .await
        .unwrap();

    let updated = env.read_file(CODEX_CONFIG).unwrap();
    assert!(updated.starts_with("# Codex settings\nmodel = \"o3\"\n"));
    assert!(updated.contains("# local docs server\ncommand = \"uvx\""));
    assert!(updated.contains("[profiles.fast]\nmodel = \"o4-mini\""));
    assert!(updated.contains("[mcp_servers.github]"));

    let parsed: toml::Table = toml::from_str(&updated).unwrap();
    let github = &parsed["mcp_servers"]["github"];
    assert_eq!(github["command"].as_str(), Some("npx"));
    assert_eq!(github["args"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_listing_reads_transport_and_enabled_flag() {
    let env = seeded();
    let listing = env
        .service()
        .list_resources(ListRequest {
            client: Some(ClientKind::CodexCli),
            kind: ResourceKind::Mcp,
            enabled: None,
        })
        .await
        .unwrap();

    assert!(listing.warning.is_none());
    assert_eq!(listing.items.len(), 1);
    let docs = &listing.items[0];
    assert_eq!(docs.display_name, "docs");
    assert!(!docs.enabled);
    assert_eq!(docs.transport_kind, Some(TransportKind::Stdio));
    assert_eq!(docs.transport_command.as_deref(), Some("uvx"));
    assert_eq!(docs.source_path, env.home_path(CODEX_CONFIG));
}

#[tokio::test]
async fn test_update_can_enable_and_switch_to_sse() {
    let env = seeded();
    let service = env.service();

    let mut payload = sse_payload("https://docs.example.com/sse");
    payload["enabled"] = json!(true);
    service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Mcp,
            MutationAction::Update,
            "docs",
            Some(payload),
        ))
        .await
        .unwrap();

    let parsed: toml::Table = toml::from_str(&env.read_file(CODEX_CONFIG).unwrap()).unwrap();
    let docs = &parsed["mcp_servers"]["docs"];
    assert_eq!(docs["url"].as_str(), Some("https://docs.example.com/sse"));
    assert!(docs.get("command").is_none());
    assert!(docs.get("args").is_none());
    assert_eq!(docs["enabled"].as_bool(), Some(true));
    assert_eq!(parsed["model"].as_str(), Some("o3"));
}

#[tokio::test]
async fn test_remove_drops_only_the_target_table() {
    let env = seeded();
    let service = env.service();

    service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Mcp,
            MutationAction::Remove,
            "docs",
            None,
        ))
        .await
        .unwrap();

    let updated = env.read_file(CODEX_CONFIG).unwrap();
    assert!(!updated.contains("mcp-docs"));
    assert!(updated.contains("approval_policy = \"on-request\""));
    assert!(updated.contains("[profiles.fast]"));
    assert_eq!(env.backups_for(ClientKind::CodexCli).unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_toml_is_parse_error_and_untouched() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(CODEX_CONFIG, "model = \n[mcp_servers\n").unwrap();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &[])),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(err.to_string().contains("TOML"));
    assert_eq!(env.read_file(CODEX_CONFIG).unwrap(), "model = \n[mcp_servers\n");
}

#[tokio::test]
async fn test_mcp_section_of_wrong_type_is_rejected() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(CODEX_CONFIG, "mcp_servers = \"none\"\n").unwrap();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Mcp,
            MutationAction::Add,
            "github",
            Some(stdio_payload("npx", &[])),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert_eq!(env.read_file(CODEX_CONFIG).unwrap(), "mcp_servers = \"none\"\n");
}
