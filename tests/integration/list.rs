use ai_manager::core::{ClientKind, ErrorCategory, ResourceKind};
use ai_manager::service::ListRequest;
use ai_manager::test_utils::TestEnvironment;

fn mcp(client: Option<ClientKind>, enabled: Option<bool>) -> ListRequest {
    ListRequest {
        client,
        kind: ResourceKind::Mcp,
        enabled,
    }
}

fn populated() -> TestEnvironment {
    let env = TestEnvironment::new().unwrap();
    env.write_file(
        ".claude/claude_code_config.json",
        r#"{"mcpServers":{"zeta":{"command":"z"},"alpha":{"url":"https://a.example.com/sse","disabled":true}}}"#,
    )
    .unwrap();
    env.write_file(
        ".codex/config.toml",
        "[mcp_servers.docs]\ncommand = \"uvx\"\nargs = [\"mcp-docs\"]\n",
    )
    .unwrap();
    env
}

#[tokio::test]
async fn test_aggregate_listing_is_sorted_across_clients() {
    let env = populated();
    let listing = env.service().list_resources(mcp(None, None)).await.unwrap();

    let names: Vec<(ClientKind, &str)> =
        listing.items.iter().map(|i| (i.client, i.display_name.as_str())).collect();
    assert_eq!(
        names,
        vec![
            (ClientKind::ClaudeCode, "alpha"),
            (ClientKind::ClaudeCode, "zeta"),
            (ClientKind::CodexCli, "docs"),
        ]
    );

    // Cursor and the Codex app have no config at all
    let warning = listing.warning.unwrap();
    assert!(warning.contains("[cursor:CONFIG_NOT_FOUND]"));
    assert!(warning.contains("[codex_app:CONFIG_NOT_FOUND]"));
    assert!(warning.contains(" | "));
}

#[tokio::test]
async fn test_enabled_filter_applies_after_listing() {
    let env = populated();
    let service = env.service();

    let enabled = service.list_resources(mcp(None, Some(true))).await.unwrap();
    assert!(enabled.items.iter().all(|i| i.enabled));
    assert_eq!(enabled.items.len(), 2);

    let disabled = service.list_resources(mcp(Some(ClientKind::ClaudeCode), Some(false))).await.unwrap();
    assert_eq!(disabled.items.len(), 1);
    assert_eq!(disabled.items[0].display_name, "alpha");
}

#[tokio::test]
async fn test_broken_config_is_a_warning_only_in_aggregate_mode() {
    let env = populated();
    env.write_file(".cursor/mcp.json", "{ not json").unwrap();
    let service = env.service();

    let listing = service.list_resources(mcp(None, None)).await.unwrap();
    assert_eq!(listing.items.len(), 3);
    assert!(listing.warning.unwrap().contains("[cursor:PARSE_ERROR]"));

    let err = service.list_resources(mcp(Some(ClientKind::Cursor), None)).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
}

#[tokio::test]
async fn test_missing_config_for_one_client_is_empty_with_warning() {
    let env = TestEnvironment::new().unwrap();
    let listing = env
        .service()
        .list_resources(mcp(Some(ClientKind::Cursor), None))
        .await
        .unwrap();

    assert!(listing.items.is_empty());
    assert!(listing.warning.unwrap().contains("CONFIG_NOT_FOUND"));
}

#[tokio::test]
async fn test_listing_is_read_only() {
    let env = populated();
    let before = env.read_file(".codex/config.toml").unwrap();
    env.service().list_resources(mcp(None, None)).await.unwrap();

    assert_eq!(env.read_file(".codex/config.toml").unwrap(), before);
    assert!(!env.backup_dir.exists());
}
