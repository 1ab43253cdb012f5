use ai_manager::core::ClientKind;
use ai_manager::detection::{ClientDetection, DetectionStatus, ReasonCode};
use ai_manager::test_utils::TestEnvironment;

fn find(detections: &[ClientDetection], client: ClientKind) -> &ClientDetection {
    detections.iter().find(|d| d.client == client).unwrap()
}

#[tokio::test]
async fn test_empty_machine_reports_every_client_absent() {
    let env = TestEnvironment::new().unwrap();
    let detections = env.service().detect_clients(false).await;

    let clients: Vec<ClientKind> = detections.iter().map(|d| d.client).collect();
    assert_eq!(clients, ClientKind::ALL.to_vec());

    let codex = find(&detections, ClientKind::CodexCli);
    assert_eq!(codex.status, DetectionStatus::Absent);
    assert_eq!(codex.confidence, 0);
    assert!(codex.evidence.binary_path.is_none());
    assert!(codex.evidence.config_path.is_none());
    assert_eq!(codex.reason, ReasonCode::BinaryAndConfigMissing);
    assert!(codex.note.starts_with("[binary_and_config_missing]"));
}

#[tokio::test]
async fn test_binary_and_config_is_detected() {
    let env = TestEnvironment::new().unwrap();
    let binary = env.install_binary("codex", "1.4.2").unwrap();
    let config = env.write_file(".codex/config.toml", "model = \"o3\"\n").unwrap();

    let detections = env.service().detect_clients(false).await;
    let codex = find(&detections, ClientKind::CodexCli);
    assert_eq!(codex.status, DetectionStatus::Detected);
    assert_eq!(codex.confidence, 100);
    assert_eq!(codex.evidence.binary_path.as_deref(), Some(binary.as_path()));
    assert_eq!(codex.evidence.config_path.as_deref(), Some(config.as_path()));
    assert!(codex.evidence.version.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_include_versions_probes_the_binary() {
    let env = TestEnvironment::new().unwrap();
    env.install_binary("claude", "2.0.1").unwrap();

    let detections = env.service().detect_clients(true).await;
    let claude = find(&detections, ClientKind::ClaudeCode);
    assert_eq!(claude.status, DetectionStatus::Partial);
    assert_eq!(claude.reason, ReasonCode::ConfigMissing);
    assert!(claude.evidence.version.as_deref().unwrap().contains("2.0.1"));
}

#[tokio::test]
async fn test_fallback_config_is_used_when_happy_path_is_missing() {
    let env = TestEnvironment::new().unwrap();
    let fallback = env.write_file(".claude.json", "{}").unwrap();

    let detections = env.service().detect_clients(false).await;
    let claude = find(&detections, ClientKind::ClaudeCode);
    assert_eq!(claude.status, DetectionStatus::Partial);
    assert_eq!(claude.reason, ReasonCode::BinaryMissing);
    assert_eq!(claude.evidence.config_path.as_deref(), Some(fallback.as_path()));
}

#[tokio::test]
async fn test_missing_override_never_falls_back() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".cursor/mcp.json", "{}").unwrap();
    let missing = env.root().join("nowhere/mcp.json");
    env.env.set_var("AI_MANAGER_CURSOR_MCP_CONFIG", missing.to_string_lossy());

    let detections = env.service().detect_clients(false).await;
    let cursor = find(&detections, ClientKind::Cursor);
    assert_eq!(cursor.reason, ReasonCode::ConfigOverrideMissing);
    assert!(cursor.evidence.config_path.is_none());
    assert!(cursor.note.contains("AI_MANAGER_CURSOR_MCP_CONFIG"));
}

#[tokio::test]
async fn test_override_changes_take_effect_on_next_call() {
    let env = TestEnvironment::new().unwrap();
    let custom = env.write_file("custom/cursor.json", "{}").unwrap();
    let service = env.service();

    let before = service.detect_clients(false).await;
    assert_eq!(find(&before, ClientKind::Cursor).status, DetectionStatus::Absent);

    env.env.set_var("AI_MANAGER_CURSOR_MCP_CONFIG", custom.to_string_lossy());
    let after = service.detect_clients(false).await;
    let cursor = find(&after, ClientKind::Cursor);
    assert_eq!(cursor.status, DetectionStatus::Partial);
    assert_eq!(cursor.evidence.config_path.as_deref(), Some(custom.as_path()));
}

#[tokio::test]
async fn test_detection_is_deterministic() {
    let env = TestEnvironment::new().unwrap();
    env.install_binary("cursor", "0.50").unwrap();
    env.write_file(".codex/config.toml", "").unwrap();
    let service = env.service();

    let first = service.detect_clients(false).await;
    for _ in 0..3 {
        let again = service.detect_clients(false).await;
        for (a, b) in first.iter().zip(&again) {
            assert_eq!(a.status, b.status);
            assert_eq!(a.confidence, b.confidence);
            assert_eq!(a.reason, b.reason);
        }
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_config_is_an_error_status() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let env = TestEnvironment::new().unwrap();
    let config = env.write_file(".codex/config.toml", "").unwrap();
    fs::set_permissions(&config, fs::Permissions::from_mode(0o000)).unwrap();
    // Root ignores file modes; nothing to assert there.
    if fs::File::open(&config).is_ok() {
        return;
    }

    let detections = env.service().detect_clients(false).await;
    let codex = find(&detections, ClientKind::CodexCli);
    assert_eq!(codex.status, DetectionStatus::Error);
    assert_eq!(codex.confidence, 0);
    assert_eq!(codex.reason, ReasonCode::ConfigPermissionDenied);

    // The other clients are unaffected
    assert_eq!(find(&detections, ClientKind::Cursor).status, DetectionStatus::Absent);
    fs::set_permissions(&config, fs::Permissions::from_mode(0o644)).unwrap();
}
