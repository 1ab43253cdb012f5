//! Detect installed clients.

use super::emit;
use crate::config::EngineConfig;
use crate::contract::OperationTracker;
use crate::detection::ClientDetection;
use crate::service::AdapterService;
use anyhow::Result;
use clap::Args;
use serde::Serialize;

/// Arguments for `ai-manager detect`.
#[derive(Args)]
pub struct DetectCommand {
    /// Also run `<binary> --version` for every resolved binary
    #[arg(long)]
    include_versions: bool,
}

#[derive(Serialize)]
struct DetectData {
    clients: Vec<ClientDetection>,
}

impl DetectCommand {
    pub async fn execute(
        self,
        service: &AdapterService,
        config: &EngineConfig,
        tracker: OperationTracker,
    ) -> Result<bool> {
        let include_versions = self.include_versions || config.include_versions;
        let clients = service.detect_clients(include_versions).await;
        tracing::info!("Detected {} client(s)", clients.len());
        emit(&tracker.succeed(DetectData { clients }))
    }
}
