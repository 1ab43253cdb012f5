//! Detector driven entirely by the Path Candidate Table.
//!
//! Every client is detected the same way (binary on `PATH`, MCP config on
//! disk), so one detector type parameterized by a [`ClientProfile`] row
//! serves all of them.

use super::version::probe_version;
use super::{
    BinaryProbe, ClientDetection, ClientDetector, DetectFuture, DetectionEvidence,
    DetectionStatus, LocationProbe, ReasonCode, format_note, probe_binary, probe_location,
};
use crate::constants::{CONFIDENCE_FULL, CONFIDENCE_NONE, CONFIDENCE_PARTIAL};
use crate::core::{ClientKind, EngineError};
use crate::paths::{CandidateKind, ClientProfile, DetectorKind, EnvSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Detector for one client row of the Path Candidate Table.
pub struct PathBasedDetector {
    profile: &'static ClientProfile,
    env: Arc<dyn EnvSource>,
    version_timeout: Duration,
}

impl PathBasedDetector {
    /// Create a detector for `profile`, reading the environment through `env`.
    pub fn new(
        profile: &'static ClientProfile,
        env: Arc<dyn EnvSource>,
        version_timeout: Duration,
    ) -> Self {
        Self {
            profile,
            env,
            version_timeout,
        }
    }
}

impl ClientDetector for PathBasedDetector {
    fn client(&self) -> ClientKind {
        self.profile.kind
    }

    fn detect(&self, include_versions: bool) -> DetectFuture<'_> {
        Box::pin(async move {
            let profile = self.profile;
            let env = Arc::clone(&self.env);
            let (binary, config) = tokio::task::spawn_blocking(move || {
                (
                    probe_binary(profile.binaries, env.as_ref()),
                    probe_location(profile, CandidateKind::McpConfig, env.as_ref()),
                )
            })
            .await
            .map_err(|e| EngineError::Unknown {
                context: format!("probing {}", profile.kind),
                message: e.to_string(),
            })?;
            let mut detection = evaluate(profile, binary, config);

            if include_versions {
                if let Some(binary) = detection.evidence.binary_path.clone() {
                    detection.evidence.version = probe_version(&binary, self.version_timeout).await;
                }
            }

            debug!(
                "Detected {}: {:?} ({}%)",
                detection.client, detection.status, detection.confidence
            );
            Ok(detection)
        })
    }
}

/// Fold probe outcomes into a detection. Pure and deterministic.
#[must_use]
pub fn evaluate(
    profile: &ClientProfile,
    binary: BinaryProbe,
    config: LocationProbe,
) -> ClientDetection {
    let name = profile.display_name;
    let binary_word = match profile.detector_kind {
        DetectorKind::Cli => "binary",
        DetectorKind::Desktop => "launcher",
    };
    let mut evidence = DetectionEvidence {
        binary_path: match binary {
            BinaryProbe::Found(path) => Some(path),
            BinaryProbe::NotFound => None,
        },
        config_path: None,
        version: None,
    };
    let has_binary = evidence.binary_path.is_some();

    let (reason, text, failed) = match config {
        LocationProbe::Found { path, .. } => {
            let found = if has_binary {
                (ReasonCode::Detected, format!("{name} {binary_word} and MCP config found"), false)
            } else {
                (
                    ReasonCode::BinaryMissing,
                    format!(
                        "{name} MCP config found at {} but no {binary_word} ({}) is on PATH",
                        path.display(),
                        profile.binaries.join(", ")
                    ),
                    false,
                )
            };
            evidence.config_path = Some(path);
            found
        }
        LocationProbe::OverrideMissing { path, env_var } => (
            ReasonCode::ConfigOverrideMissing,
            format!("{env_var} points to {}, which does not exist", path.display()),
            false,
        ),
        LocationProbe::OverrideUnusable {
            path,
            env_var,
            reason,
        } => (
            ReasonCode::ConfigOverrideMissing,
            format!("{env_var} points to {}, which cannot be used: {reason}", path.display()),
            false,
        ),
        LocationProbe::OverridePermissionDenied { path, env_var } => (
            ReasonCode::ConfigPermissionDenied,
            format!("{env_var} points to {}, which cannot be read", path.display()),
            true,
        ),
        LocationProbe::PermissionDenied { path } => (
            ReasonCode::ConfigPermissionDenied,
            format!("{name} MCP config at {} exists but cannot be read", path.display()),
            true,
        ),
        LocationProbe::Unreadable { path, reason } => (
            ReasonCode::ProbeFailed,
            format!("Failed to probe {name} MCP config at {}: {reason}", path.display()),
            true,
        ),
        LocationProbe::NotFound if has_binary => (
            ReasonCode::ConfigMissing,
            format!("{name} {binary_word} found but no MCP config exists yet"),
            false,
        ),
        LocationProbe::NotFound => (
            ReasonCode::BinaryAndConfigMissing,
            format!("{name} not found: no {binary_word} on PATH and no MCP config"),
            false,
        ),
    };

    let (status, confidence) = if failed {
        (DetectionStatus::Error, CONFIDENCE_NONE)
    } else {
        match evidence.resolved_count() {
            2 => (DetectionStatus::Detected, CONFIDENCE_FULL),
            1 => (DetectionStatus::Partial, CONFIDENCE_PARTIAL),
            _ => (DetectionStatus::Absent, CONFIDENCE_NONE),
        }
    };

    ClientDetection {
        client: profile.kind,
        status,
        confidence,
        evidence,
        reason,
        note: format_note(reason, &text),
    }
}
