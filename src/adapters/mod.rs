//! Format-aware readers and writers for client configuration.
//!
//! Every client is served by one [`ClientAdapter`]. The default
//! [`ConfigAdapter`] is driven by the client's row in the Path Candidate
//! Table, so adding a client means adding a table row and registering an
//! adapter for it; no dispatch code changes.
//!
//! Two resource kinds are handled:
//!
//! - [`mcp`]: server entries inside a JSON or TOML document
//! - [`skills`]: manifests stored as `<root>/<name>/SKILL.md` or `<root>/<name>.md`
//!
//! Listing is read-only and reports soft problems as [`ListWarning`]s.
//! Mutations follow one contract: resolve the location, validate the action
//! against what exists, then back up, write and verify inside a
//! [`MutationTransaction`](crate::backup::MutationTransaction).

pub mod mcp;
pub mod registry;
pub mod skills;

pub use registry::AdapterRegistry;

use crate::backup::{BackupManager, BackupRecord, FaultInjection};
use crate::core::{
    ClientKind, EngineError, EngineResult, MutationAction, ResourceKind, ResourceRecord,
};
use crate::detection::LocationProbe;
use crate::paths::{CandidateKind, ClientProfile, EnvSource};
use std::fmt;
use std::path::PathBuf;

/// A non-fatal problem found while listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWarning {
    /// Client the warning belongs to
    pub client: ClientKind,
    /// Stable code such as `MCP_SECTION_MISSING`
    pub code: &'static str,
    /// Human-readable detail naming the path or entry
    pub message: String,
}

impl fmt::Display for ListWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.client, self.code, self.message)
    }
}

/// Result of listing one resource kind for one client.
#[derive(Debug, Clone, Default)]
pub struct AdapterListing {
    /// Parsed entries
    pub items: Vec<ResourceRecord>,
    /// Soft problems
    pub warnings: Vec<ListWarning>,
}

impl AdapterListing {
    pub(crate) fn only_warning(client: ClientKind, code: &'static str, message: String) -> Self {
        let mut listing = Self::default();
        listing.warn(client, code, message);
        listing
    }

    pub(crate) fn warn(&mut self, client: ClientKind, code: &'static str, message: String) {
        tracing::debug!("{client} listing warning {code}: {message}");
        self.warnings.push(ListWarning {
            client,
            code,
            message,
        });
    }
}

/// One mutation as handed to an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    /// Client to mutate
    pub client: ClientKind,
    /// MCP server or skill
    pub kind: ResourceKind,
    /// Add, remove or update
    pub action: MutationAction,
    /// Entry name (already trimmed)
    pub target_id: String,
    /// Kind-specific payload
    pub payload: Option<serde_json::Value>,
}

/// Successful mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// Always `true` for a returned outcome
    pub accepted: bool,
    /// Confirmation naming the entry and location
    pub message: String,
    /// File or directory that was changed
    pub source_path: PathBuf,
    /// Backup kept for manual recovery, absent when the target was new
    pub backup: Option<BackupRecord>,
}

/// What an adapter needs from the service to mutate.
#[derive(Clone, Copy)]
pub struct MutationContext<'a> {
    /// Environment for overrides and `~`
    pub env: &'a dyn EnvSource,
    /// Where backups go
    pub backups: &'a BackupManager,
    /// Test hook
    pub faults: FaultInjection,
}

/// Capability shared by every client adapter.
pub trait ClientAdapter: Send + Sync {
    /// Client served by this adapter.
    fn client(&self) -> ClientKind;

    /// List entries of `kind`.
    ///
    /// # Errors
    ///
    /// Hard failures only: an unreadable location or a document that does
    /// not parse. Missing files and malformed entries are warnings.
    fn list_resources(&self, kind: ResourceKind, env: &dyn EnvSource) -> EngineResult<AdapterListing>;

    /// Apply one mutation.
    ///
    /// # Errors
    ///
    /// Validation failures are returned before anything is touched. Failures
    /// after the backup was taken are returned as
    /// [`EngineError::RolledBack`] once the original state is restored.
    fn mutate(
        &self,
        request: &MutationRequest,
        ctx: &MutationContext<'_>,
    ) -> EngineResult<MutationOutcome>;
}

/// Adapter driven entirely by a [`ClientProfile`].
#[derive(Debug, Clone, Copy)]
pub struct ConfigAdapter {
    profile: &'static ClientProfile,
}

impl ConfigAdapter {
    /// Adapter for the client described by `profile`.
    #[must_use]
    pub const fn new(profile: &'static ClientProfile) -> Self {
        Self { profile }
    }

    /// Profile this adapter reads.
    #[must_use]
    pub const fn profile(&self) -> &'static ClientProfile {
        self.profile
    }
}

impl ClientAdapter for ConfigAdapter {
    fn client(&self) -> ClientKind {
        self.profile.kind
    }

    fn list_resources(&self, kind: ResourceKind, env: &dyn EnvSource) -> EngineResult<AdapterListing> {
        match kind {
            ResourceKind::Mcp => mcp::list(self.profile, env),
            ResourceKind::Skill => skills::list(self.profile, env),
        }
    }

    fn mutate(
        &self,
        request: &MutationRequest,
        ctx: &MutationContext<'_>,
    ) -> EngineResult<MutationOutcome> {
        if request.client != self.profile.kind {
            return Err(EngineError::invalid(
                request.kind,
                &request.target_id,
                format!("request for {} sent to the {} adapter", request.client, self.profile.kind),
            ));
        }
        match request.kind {
            ResourceKind::Mcp => mcp::mutate(self.profile, request, ctx),
            ResourceKind::Skill => skills::mutate(self.profile, request, ctx),
        }
    }
}

/// Map a probe that blocks access to its error.
pub(crate) fn blocked(probe: &LocationProbe, client: ClientKind, kind: ResourceKind) -> EngineError {
    probe.access_error(client, kind).unwrap_or_else(|| EngineError::Unknown {
        context: format!("resolving {client} {}", kind.label()),
        message: format!("unexpected probe outcome {probe:?}"),
    })
}

/// Conventional location of `kind` for `profile`.
pub(crate) fn happy_path(
    profile: &ClientProfile,
    kind: CandidateKind,
    resource: ResourceKind,
    env: &dyn EnvSource,
) -> EngineResult<PathBuf> {
    profile
        .happy_path(kind)
        .map(|candidate| candidate.resolve(env))
        .ok_or_else(|| EngineError::Unresolved {
            client: profile.kind,
            kind: resource,
            reason: format!("no default {} location", kind.label()),
        })
}

/// Location a mutation writes to, following the same priority rule as
/// detection. `add` may create the file; `remove` and `update` need it.
pub(crate) fn resolve_location(
    profile: &ClientProfile,
    kind: CandidateKind,
    request: &MutationRequest,
    env: &dyn EnvSource,
) -> EngineResult<PathBuf> {
    let resource = request.kind;
    let creating = request.action == MutationAction::Add;
    let probe = crate::detection::probe_location(profile, kind, env);

    match probe {
        LocationProbe::Found { path, .. } => Ok(path),
        LocationProbe::OverrideMissing { path, env_var } => {
            if creating {
                tracing::debug!("{} points at missing {}; creating it", env_var, path.display());
                Ok(path)
            } else {
                Err(EngineError::NotFound {
                    kind: resource,
                    name: request.target_id.clone(),
                    location: path,
                })
            }
        }
        LocationProbe::OverrideUnusable {
            path,
            env_var,
            reason,
        } => Err(EngineError::invalid(
            resource,
            &request.target_id,
            format!("{env_var} points at {}, which cannot be used: {reason}", path.display()),
        )),
        LocationProbe::NotFound => {
            let path = happy_path(profile, kind, resource, env)?;
            if creating {
                Ok(path)
            } else {
                Err(EngineError::NotFound {
                    kind: resource,
                    name: request.target_id.clone(),
                    location: path,
                })
            }
        }
        other => Err(blocked(&other, profile.kind, resource)),
    }
}
