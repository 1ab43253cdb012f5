use ai_manager::paths::{EnvSource, SystemEnv};
use serial_test::serial;

#[test]
#[serial]
fn test_system_env_trims_and_ignores_blank_values() {
    const VAR: &str = "AI_MANAGER_CURSOR_MCP_CONFIG";
    let previous = std::env::var_os(VAR);

    // SAFETY: serialised with every other test that touches the process environment
    unsafe { std::env::set_var(VAR, "  /tmp/cursor.json  ") };
    assert_eq!(SystemEnv.non_empty_var(VAR).as_deref(), Some("/tmp/cursor.json"));

    unsafe { std::env::set_var(VAR, "   ") };
    assert_eq!(SystemEnv.non_empty_var(VAR), None);

    match previous {
        Some(value) => unsafe { std::env::set_var(VAR, value) },
        None => unsafe { std::env::remove_var(VAR) },
    }
}
