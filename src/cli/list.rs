//! List MCP servers or skills.

use super::emit_result;
use crate::contract::OperationTracker;
use crate::core::{ClientKind, EngineResult, ResourceKind};
use crate::service::{AdapterService, ListRequest, ListResponse};
use anyhow::Result;
use clap::Args;

/// Arguments for `ai-manager list`.
#[derive(Args)]
pub struct ListCommand {
    /// Resource kind: `mcp` or `skill`
    #[arg(long)]
    kind: String,

    /// Only this client; failures are then errors instead of warnings
    #[arg(long)]
    client: Option<String>,

    /// Keep only enabled (`true`) or disabled (`false`) entries
    #[arg(long)]
    enabled: Option<bool>,
}

impl ListCommand {
    pub async fn execute(self, service: &AdapterService, tracker: OperationTracker) -> Result<bool> {
        let result = self.run(service).await;
        emit_result(tracker, result)
    }

    async fn run(self, service: &AdapterService) -> EngineResult<ListResponse> {
        let request = ListRequest {
            client: self.client.as_deref().map(str::parse::<ClientKind>).transpose()?,
            kind: self.kind.parse::<ResourceKind>()?,
            enabled: self.enabled,
        };
        service.list_resources(request).await
    }
}
