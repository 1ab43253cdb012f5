//! ai-manager - detection and mutation engine for AI coding-assistant clients
//!
//! Finds out which AI coding clients (Claude Code, Codex CLI, Cursor, the
//! Codex desktop app) are installed on a machine, and safely adds, updates or
//! removes entries in their configuration: MCP server registrations inside
//! JSON or TOML documents, and skills stored as directories or single
//! markdown files.
//!
//! # Architecture Overview
//!
//! ```text
//! caller -> AdapterService -> DetectorRegistry -> probes (PATH, filesystem, --version)
//!                          -> AdapterRegistry  -> format-aware readers/writers
//!                          -> BackupManager    -> backup, atomic write, rollback
//! ```
//!
//! Every client is described by one row of a static path candidate table
//! ([`paths::CLIENT_PROFILES`]). Detection and mutation resolve paths through
//! the same table and the same override environment variables, so the file
//! `detect` reports is the file `mutate` edits.
//!
//! ## Key Properties
//!
//! - **Deterministic detection**: status and confidence are pure functions of
//!   which evidence resolved
//! - **Format preserving**: unrelated keys, comments and ordering survive a
//!   mutation
//! - **Transactional**: every write is preceded by a backup and a failed
//!   mutation restores the original bytes before the error is returned
//! - **Categorized errors**: every failure carries one of six categories and a
//!   recoverable flag
//!
//! # Core Modules
//!
//! - [`core`] - Client and resource identifiers, records and the error taxonomy
//! - [`paths`] - Path candidate table, override variables and path expansion
//! - [`detection`] - Probes, per-client detectors and the detector registry
//! - [`adapters`] - MCP (JSON/TOML) and skill adapters and their registry
//! - [`backup`] - Backup manager and mutation transactions
//! - [`service`] - The detect/list/mutate orchestration boundary
//!
//! ## Supporting Modules
//!
//! - [`config`] - Engine settings (`~/.ai-manager/config.toml`)
//! - [`contract`] - JSON command envelope and secret redaction
//! - [`cli`] - Command-line interface
//! - [`utils`] - Atomic writes and filesystem helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use ai_manager::config::EngineConfig;
//! use ai_manager::core::ResourceKind;
//! use ai_manager::paths::{EnvSource, SystemEnv};
//! use ai_manager::service::{AdapterService, ListRequest};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let env: Arc<dyn EnvSource> = Arc::new(SystemEnv);
//! let config = EngineConfig::load(env.as_ref()).await?;
//! let service = AdapterService::from_config(&config, env)?;
//!
//! for detection in service.detect_clients(false).await {
//!     println!("{}: {:?} ({})", detection.client, detection.status, detection.confidence);
//! }
//!
//! let listing = service
//!     .list_resources(ListRequest { client: None, kind: ResourceKind::Mcp, enabled: None })
//!     .await?;
//! println!("{} MCP server(s)", listing.items.len());
//! # Ok(())
//! # }
//! ```

// Engine
pub mod adapters;
pub mod backup;
pub mod core;
pub mod detection;
pub mod paths;
pub mod service;

// Command layer
pub mod cli;
pub mod contract;

// Supporting modules
pub mod config;
pub mod constants;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
