use crate::common::{cli, envelope};
use ai_manager::test_utils::TestEnvironment;
use predicates::prelude::*;

#[test]
fn test_detect_prints_one_successful_envelope() {
    let env = TestEnvironment::new().unwrap();
    let output = cli(&env).arg("detect").assert().success().get_output().stdout.clone();

    let value = envelope(&output);
    assert_eq!(value["ok"], true);
    assert!(value["meta"]["operation_id"].as_str().unwrap().starts_with("detect-"));
    assert_eq!(value["meta"]["lifecycle"]["phase"], "completed");

    let clients = value["data"]["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 4);
    let codex = clients.iter().find(|c| c["client"] == "codex_cli").unwrap();
    assert_eq!(codex["status"], "absent");
    assert_eq!(codex["confidence"], 0);
    assert_eq!(codex["reason"], "binary_and_config_missing");
}

#[test]
fn test_mutate_then_list_round_trip() {
    let env = TestEnvironment::new().unwrap();

    let output = cli(&env)
        .args([
            "mutate",
            "--client",
            "cursor",
            "--kind",
            "mcp",
            "--action",
            "add",
            "--target",
            "github",
            "--payload",
            r#"{"transport":{"command":"npx","args":["-y","@modelcontextprotocol/server-github"]}}"#,
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value = envelope(&output);
    assert_eq!(value["data"]["accepted"], true);
    assert_eq!(value["data"]["action"], "add");
    assert!(env.exists(".cursor/mcp.json"));

    let output = cli(&env)
        .args(["list", "--kind", "mcp", "--client", "cursor"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value = envelope(&output);
    assert_eq!(value["data"]["items"][0]["display_name"], "github");
    assert_eq!(value["data"]["items"][0]["transport_kind"], "stdio");
}

#[test]
fn test_validation_failure_exits_nonzero_with_error_envelope() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".cursor/mcp.json", r#"{"mcpServers":{"github":{"command":"npx"}}}"#).unwrap();

    let output = cli(&env)
        .args([
            "mutate", "--client", "cursor", "--kind", "mcp", "--action", "add", "--target", "github",
            "--payload", r#"{"transport":{"command":"npx"}}"#,
        ])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let value = envelope(&output);
    assert_eq!(value["ok"], false);
    assert_eq!(value["data"], serde_json::Value::Null);
    assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(value["error"]["recoverable"], true);
    assert!(value["error"]["message"].as_str().unwrap().contains("already exists"));
    assert_eq!(value["meta"]["lifecycle"]["phase"], "failed");
}

#[test]
fn test_unknown_client_and_bad_payload_are_validation_errors() {
    let env = TestEnvironment::new().unwrap();

    let output = cli(&env)
        .args(["list", "--kind", "mcp", "--client", "vim"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    assert_eq!(envelope(&output)["error"]["code"], "VALIDATION_ERROR");

    let output = cli(&env)
        .args([
            "mutate", "--client", "cursor", "--kind", "mcp", "--action", "add", "--target", "x",
            "--payload", "{not json",
        ])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    assert!(
        envelope(&output)["error"]["message"]
            .as_str()
            .unwrap()
            .contains("payload is not valid JSON")
    );
}

#[test]
fn test_secrets_never_reach_stdout() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(
        ".claude/claude_code_config.json",
        r#"{"mcpServers":{"remote":{"url":"https://mcp.example.com/sse?token=hunter2secret"}}}"#,
    )
    .unwrap();

    cli(&env)
        .args(["list", "--kind", "mcp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("token=[REDACTED]"))
        .stdout(predicate::str::contains("hunter2secret").not());
}

#[test]
fn test_unreadable_engine_config_is_reported_on_stderr() {
    let env = TestEnvironment::new().unwrap();
    let config = env.write_file(".ai-manager/config.toml", "version_probe_timeout_ms = \"soon\"\n").unwrap();

    cli(&env)
        .arg("detect")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(config.display().to_string()));
}
