//! Add, update or remove one resource.

use super::emit_result;
use crate::contract::OperationTracker;
use crate::core::{ClientKind, EngineError, EngineResult, MutationAction, ResourceKind};
use crate::service::{AdapterService, MutateRequest, MutationResponse};
use anyhow::Result;
use clap::Args;
use serde_json::Value;

/// Arguments for `ai-manager mutate`.
#[derive(Args)]
pub struct MutateCommand {
    /// Target client, e.g. `cursor` or `codex_cli`
    #[arg(long)]
    client: String,

    /// Resource kind: `mcp` or `skill`
    #[arg(long)]
    kind: String,

    /// `add`, `update` or `remove`
    #[arg(long)]
    action: String,

    /// Server or skill name
    #[arg(long)]
    target: String,

    /// JSON payload describing the resource
    #[arg(long)]
    payload: Option<String>,
}

impl MutateCommand {
    pub async fn execute(self, service: &AdapterService, tracker: OperationTracker) -> Result<bool> {
        let result = self.run(service).await;
        emit_result(tracker, result)
    }

    async fn run(self, service: &AdapterService) -> EngineResult<MutationResponse> {
        let kind = self.kind.parse::<ResourceKind>()?;
        let payload = self
            .payload
            .as_deref()
            .map(|raw| {
                serde_json::from_str::<Value>(raw).map_err(|e| {
                    EngineError::invalid(kind, &self.target, format!("payload is not valid JSON: {e}"))
                })
            })
            .transpose()?;

        let request = MutateRequest {
            client: self.client.parse::<ClientKind>()?,
            kind,
            action: self.action.parse::<MutationAction>()?,
            target_id: self.target,
            payload,
        };
        service.mutate_resource(request).await
    }
}
