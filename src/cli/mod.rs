//! Command-line interface for ai-manager.
//!
//! The CLI is a thin layer over [`AdapterService`]: every command builds a
//! request, runs it, and prints exactly one JSON envelope on stdout. Logs go
//! to stderr so the envelope can be piped straight into another tool.
//!
//! # Commands
//!
//! - `detect` - Report which clients are installed and configured
//! - `list` - List MCP servers or skills, for one client or all of them
//! - `mutate` - Add, update or remove one MCP server or skill
//!
//! # Example
//!
//! ```bash
//! ai-manager detect --include-versions
//! ai-manager list --kind mcp --enabled true
//! ai-manager mutate --client cursor --kind mcp --action add --target github \
//!     --payload '{"transport":{"command":"npx","args":["-y","@modelcontextprotocol/server-github"]}}'
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging on stderr
//! - `--quiet` - Only errors on stderr
//! - `--config` - Path to an engine config file
//!
//! The process exits with status 1 whenever the envelope reports `ok: false`.

mod detect;
mod list;
mod mutate;

use crate::config::EngineConfig;
use crate::contract::{CommandEnvelope, OperationTracker};
use crate::core::EngineError;
use crate::paths::{EnvSource, SystemEnv};
use crate::service::AdapterService;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Top-level arguments.
#[derive(Parser)]
#[command(
    name = "ai-manager",
    about = "Detect AI coding-assistant clients and manage their MCP servers and skills",
    version,
    author,
    long_about = "ai-manager finds installed AI coding clients and edits their MCP server and skill \
                  configuration with a backup taken before every write."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the engine config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect installed clients
    Detect(detect::DetectCommand),

    /// List MCP servers or skills
    List(list::ListCommand),

    /// Add, update or remove one resource
    Mutate(mutate::MutateCommand),
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Detect(_) => "detect",
            Self::List(_) => "list",
            Self::Mutate(_) => "mutate",
        }
    }
}

impl Cli {
    /// Run the selected command.
    ///
    /// Returns whether the printed envelope reported success.
    ///
    /// # Errors
    ///
    /// Fails only before an envelope can be produced, for example when the
    /// engine config is unreadable or stdout is closed.
    pub async fn execute(self) -> Result<bool> {
        self.init_logging();

        let env: Arc<dyn EnvSource> = Arc::new(SystemEnv);
        let config = EngineConfig::load_with_optional(self.config.clone(), env.as_ref()).await?;
        let service = AdapterService::from_config(&config, env)?;
        self.execute_with_service(&service, &config).await
    }

    /// Run the selected command against an already built service.
    ///
    /// # Errors
    ///
    /// Fails only when the envelope cannot be written.
    pub async fn execute_with_service(
        self,
        service: &AdapterService,
        config: &EngineConfig,
    ) -> Result<bool> {
        let tracker = OperationTracker::start(self.command.name());
        match self.command {
            Commands::Detect(cmd) => cmd.execute(service, config, tracker).await,
            Commands::List(cmd) => cmd.execute(service, tracker).await,
            Commands::Mutate(cmd) => cmd.execute(service, tracker).await,
        }
    }

    fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        // A subscriber may already be installed when running under tests.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Print an envelope and report whether it was successful.
pub(crate) fn emit<T: Serialize>(envelope: &CommandEnvelope<T>) -> Result<bool> {
    println!("{}", envelope.to_json()?);
    Ok(envelope.ok)
}

/// Print the envelope for `result`.
pub(crate) fn emit_result<T: Serialize>(
    tracker: OperationTracker,
    result: Result<T, EngineError>,
) -> Result<bool> {
    match result {
        Ok(data) => emit(&tracker.succeed(data)),
        Err(error) => {
            tracing::debug!("{} failed: {}", tracker.operation_id(), error);
            emit(&tracker.fail::<T>(&error))
        }
    }
}
