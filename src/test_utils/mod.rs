//! Test utilities for ai-manager
//!
//! Helpers shared by unit tests and the integration suite (enable the
//! `test-utils` feature to use them from outside the crate):
//! - [`MapEnv`], an in-memory environment so tests never read the real
//!   `HOME`, `PATH` or override variables
//! - [`TestEnvironment`], a temporary home with a search path, a backup
//!   directory and a ready-made service
//!
//! # Example
//!
//! ```rust,no_run
//! use ai_manager::test_utils::TestEnvironment;
//!
//! let env = TestEnvironment::new().unwrap();
//! env.write_file(".cursor/mcp.json", r#"{"mcpServers":{}}"#).unwrap();
//! let service = env.service();
//! ```

pub mod env;
pub mod environment;

pub use env::MapEnv;
pub use environment::TestEnvironment;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=ai_manager=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
