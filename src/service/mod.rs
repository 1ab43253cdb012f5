//! The orchestration boundary: detect, list and mutate.
//!
//! [`AdapterService`] owns the detector and adapter registries, the backup
//! manager and the environment. Everything is injected, so tests can build a
//! service over fake clients or a temporary home directory.
//!
//! Mutations on the same `(client, resource kind)` pair are serialized by an
//! async mutex held for the whole backup-write-verify sequence, even when the
//! caller drops the future half way. Detection and
//! listing take no locks.

use crate::adapters::{AdapterRegistry, MutationContext, MutationRequest};
use crate::backup::{BackupManager, FaultInjection};
use crate::config::EngineConfig;
use crate::core::{
    ClientKind, EngineError, EngineResult, MutationAction, ResourceKind, ResourceRecord,
};
use crate::detection::{ClientDetection, DetectorRegistry};
use crate::paths::EnvSource;
use dashmap::DashMap;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Parameters of a list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRequest {
    /// One client, or every registered client when `None`
    pub client: Option<ClientKind>,
    /// MCP servers or skills
    pub kind: ResourceKind,
    /// Keep only entries with this enabled flag
    pub enabled: Option<bool>,
}

/// Result of a list call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListResponse {
    /// Entries sorted by client, name and id
    pub items: Vec<ResourceRecord>,
    /// Per-client warnings joined with `" | "`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Parameters of a mutate call.
#[derive(Debug, Clone, PartialEq)]
pub struct MutateRequest {
    /// Client to change
    pub client: ClientKind,
    /// MCP server or skill
    pub kind: ResourceKind,
    /// Add, remove or update
    pub action: MutationAction,
    /// Entry name; surrounding whitespace is ignored
    pub target_id: String,
    /// Kind-specific payload
    pub payload: Option<serde_json::Value>,
}

/// Result of a successful mutate call.
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    /// Always `true` for a returned response
    pub accepted: bool,
    /// Action that was applied
    pub action: MutationAction,
    /// Trimmed entry name
    pub target_id: String,
    /// Confirmation, including the backup location when one was taken
    pub message: String,
    /// File or directory that was changed
    pub source_path: PathBuf,
    /// Backup kept for manual recovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

type LockKey = (ClientKind, ResourceKind);

/// Detect, list and mutate over injected registries.
pub struct AdapterService {
    detectors: DetectorRegistry,
    adapters: AdapterRegistry,
    backups: BackupManager,
    env: Arc<dyn EnvSource>,
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
    faults: FaultInjection,
}

impl AdapterService {
    /// Service over explicit collaborators.
    pub fn new(
        detectors: DetectorRegistry,
        adapters: AdapterRegistry,
        backups: BackupManager,
        env: Arc<dyn EnvSource>,
    ) -> Self {
        Self {
            detectors,
            adapters,
            backups,
            env,
            locks: DashMap::new(),
            faults: FaultInjection::default(),
        }
    }

    /// Service with the default registries, configured by `config`.
    ///
    /// # Errors
    ///
    /// Fails when the backup root cannot be determined.
    pub fn from_config(config: &EngineConfig, env: Arc<dyn EnvSource>) -> anyhow::Result<Self> {
        let backups = BackupManager::new(config.backup_root(env.as_ref())?);
        let detectors = DetectorRegistry::with_default_detectors(
            Arc::clone(&env),
            config.version_probe_timeout(),
        );
        Ok(Self::new(detectors, AdapterRegistry::with_default_adapters(), backups, env))
    }

    /// Make every following mutation fail at the given points.
    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn with_fault_injection(mut self, faults: FaultInjection) -> Self {
        self.faults = faults;
        self
    }

    /// Backup manager used for mutations.
    #[must_use]
    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Run every detector. Never fails as a whole.
    pub async fn detect_clients(&self, include_versions: bool) -> Vec<ClientDetection> {
        debug!("Detecting {} client(s)", self.detectors.clients().len());
        self.detectors.detect_all(include_versions).await
    }

    /// List resources of one kind.
    ///
    /// With an explicit client any adapter failure is returned as an error.
    /// Without one, failures of individual clients become warnings so one
    /// broken config never hides the others.
    ///
    /// # Errors
    ///
    /// Only when `request.client` is set: the client has no adapter or its
    /// configuration could not be read or parsed.
    pub async fn list_resources(&self, request: ListRequest) -> EngineResult<ListResponse> {
        let adapters = match request.client {
            Some(client) => vec![self.adapter(client, request.kind)?],
            None => self.adapters.iter().cloned().collect(),
        };

        let env = Arc::clone(&self.env);
        let kind = request.kind;
        let strict = request.client.is_some();
        let outcomes = tokio::task::spawn_blocking(move || {
            adapters
                .iter()
                .map(|adapter| (adapter.client(), adapter.list_resources(kind, env.as_ref())))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| EngineError::Unknown {
            context: format!("listing {}", kind.label()),
            message: e.to_string(),
        })?;

        let mut items = Vec::new();
        let mut warnings = Vec::new();
        for (client, outcome) in outcomes {
            match outcome {
                Ok(listing) => {
                    items.extend(listing.items);
                    warnings.extend(listing.warnings.iter().map(ToString::to_string));
                }
                Err(e) if strict => return Err(e),
                Err(e) => {
                    warn!("Listing {} for {} failed: {}", kind.label(), client, e);
                    warnings.push(format!("[{client}:{}] {e}", e.code()));
                }
            }
        }

        items.sort_by(|a, b| {
            (a.client, &a.display_name, &a.id).cmp(&(b.client, &b.display_name, &b.id))
        });
        if let Some(enabled) = request.enabled {
            items.retain(|item| item.enabled == enabled);
        }

        Ok(ListResponse {
            items,
            warning: (!warnings.is_empty()).then(|| warnings.join(" | ")),
        })
    }

    /// Apply one mutation.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before anything is touched; any later
    /// failure is returned after the target was restored.
    pub async fn mutate_resource(&self, request: MutateRequest) -> EngineResult<MutationResponse> {
        let target_id = request.target_id.trim().to_string();
        if target_id.is_empty() {
            return Err(EngineError::invalid(request.kind, "", "target_id must not be empty"));
        }
        let adapter = self.adapter(request.client, request.kind)?;

        // The guard moves into the blocking task: a caller that stops polling
        // must not free the key while the write is still running.
        let guard = self.lock_for((request.client, request.kind)).lock_owned().await;
        debug!("Acquired mutation lock for {} {}", request.client, request.kind.label());

        let adapter_request = MutationRequest {
            client: request.client,
            kind: request.kind,
            action: request.action,
            target_id: target_id.clone(),
            payload: request.payload,
        };
        let env = Arc::clone(&self.env);
        let backups = self.backups.clone();
        let faults = self.faults;
        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let ctx = MutationContext {
                env: env.as_ref(),
                backups: &backups,
                faults,
            };
            adapter.mutate(&adapter_request, &ctx)
        })
        .await
        .map_err(|e| EngineError::Unknown {
            context: format!("mutating {} '{target_id}'", request.kind.label()),
            message: e.to_string(),
        })??;

        let backup_path = outcome.backup.map(|record| record.backup_path);
        let message = match &backup_path {
            Some(path) => format!("{}. Backup: {}.", outcome.message, path.display()),
            None => format!("{}.", outcome.message),
        };
        info!("{}", message);

        Ok(MutationResponse {
            accepted: outcome.accepted,
            action: request.action,
            target_id,
            message,
            source_path: outcome.source_path,
            backup_path,
        })
    }

    fn adapter(
        &self,
        client: ClientKind,
        kind: ResourceKind,
    ) -> EngineResult<Arc<dyn crate::adapters::ClientAdapter>> {
        self.adapters.get(client).ok_or_else(|| EngineError::Unresolved {
            client,
            kind,
            reason: "no adapter registered".to_string(),
        })
    }

    fn lock_for(&self, key: LockKey) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(key).or_default().value())
    }
}
