//! ai-manager CLI entry point
//!
//! Parses arguments, runs one command and prints its JSON envelope:
//! - `detect` - Detect installed clients
//! - `list` - List MCP servers or skills
//! - `mutate` - Add, update or remove one resource

use ai_manager::cli;
use ai_manager::core::user_friendly_error;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(true) => Ok(()),
        // The envelope on stdout already describes the failure
        Ok(false) => std::process::exit(1),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
