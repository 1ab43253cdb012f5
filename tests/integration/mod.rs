//! Integration test suite for ai-manager
//!
//! End-to-end tests that drive the service and the CLI against temporary
//! home directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: JSON envelopes and exit codes of the binary
//! - **detection**: Detector statuses, overrides and determinism
//! - **list**: Aggregated and per-client listings
//! - **mcp_json**: MCP mutations on JSON documents
//! - **mcp_toml**: MCP mutations on TOML documents
//! - **rollback**: Backups, fault injection and restore
//! - **skills**: Skill installs in directory and file layouts
//! - **system_env**: The process-backed environment

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod detection;
mod list;
mod mcp_json;
mod mcp_toml;
mod rollback;
mod skills;
mod system_env;
