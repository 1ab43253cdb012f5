//! Client detection
//!
//! A [`ClientDetector`] decides whether one client is installed and
//! configured. Detectors share a single capability interface and are held in
//! a [`DetectorRegistry`] that the service runs as a whole.
//!
//! Status is a pure function of the evidence that resolved:
//!
//! | binary | config | status | confidence |
//! |---|---|---|---|
//! | yes | yes | `detected` | 100 |
//! | one of the two | | `partial` | 60 |
//! | no | no | `absent` | 0 |
//!
//! A probe that fails with anything other than "missing" yields `error` with
//! confidence 0. Version probing never changes the status.

pub mod path_based;
pub mod probe;
pub mod registry;
pub mod version;

pub use path_based::PathBasedDetector;
pub use probe::{BinaryProbe, LocationProbe, probe_binary, probe_location};
pub use registry::DetectorRegistry;

use crate::core::{ClientKind, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

/// Overall detection outcome for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    /// Neither binary nor config found
    Absent,
    /// Exactly one of binary or config found
    Partial,
    /// Binary and config found
    Detected,
    /// A probe failed unexpectedly
    Error,
}

/// Machine-readable reason attached to every detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Binary and config both resolved
    Detected,
    /// Config resolved, binary did not
    BinaryMissing,
    /// Binary resolved, config did not
    ConfigMissing,
    /// Nothing resolved
    BinaryAndConfigMissing,
    /// Override variable points at a missing path
    ConfigOverrideMissing,
    /// Config exists but may not be read
    ConfigPermissionDenied,
    /// Unexpected I/O failure or detector error
    ProbeFailed,
}

impl ReasonCode {
    /// Stable key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::BinaryMissing => "binary_missing",
            Self::ConfigMissing => "config_missing",
            Self::BinaryAndConfigMissing => "binary_and_config_missing",
            Self::ConfigOverrideMissing => "config_override_missing",
            Self::ConfigPermissionDenied => "config_permission_denied",
            Self::ProbeFailed => "probe_failed",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts a detector resolved. Fields are a resolved path or absent, never a guess.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvidence {
    /// Binary found on the search path
    pub binary_path: Option<PathBuf>,
    /// Readable MCP config
    pub config_path: Option<PathBuf>,
    /// First line of `<binary> --version`
    pub version: Option<String>,
}

impl DetectionEvidence {
    /// Number of resolved path fields (0 to 2).
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        usize::from(self.binary_path.is_some()) + usize::from(self.config_path.is_some())
    }
}

/// Result of detecting one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetection {
    /// Client detected
    pub client: ClientKind,
    /// Outcome
    pub status: DetectionStatus,
    /// 0 to 100, monotonic in resolved evidence
    pub confidence: u8,
    /// What resolved
    pub evidence: DetectionEvidence,
    /// Machine-readable reason
    pub reason: ReasonCode,
    /// `"[<reason>] <human text>"`
    pub note: String,
}

impl ClientDetection {
    /// Detection for a client whose detector itself failed.
    #[must_use]
    pub fn failed(client: ClientKind, message: &str) -> Self {
        Self {
            client,
            status: DetectionStatus::Error,
            confidence: crate::constants::CONFIDENCE_NONE,
            evidence: DetectionEvidence::default(),
            reason: ReasonCode::ProbeFailed,
            note: format_note(ReasonCode::ProbeFailed, message),
        }
    }
}

/// Render a note as `"[<reason>] <text>"`.
#[must_use]
pub fn format_note(reason: ReasonCode, text: &str) -> String {
    format!("[{reason}] {text}")
}

/// Boxed future returned by [`ClientDetector::detect`].
pub type DetectFuture<'a> = Pin<Box<dyn Future<Output = EngineResult<ClientDetection>> + Send + 'a>>;

/// Capability shared by every detector.
pub trait ClientDetector: Send + Sync {
    /// Client this detector answers for.
    fn client(&self) -> ClientKind;

    /// Probe the machine. Probe outcomes are folded into the returned
    /// detection; an `Err` means the detector itself broke and is reported
    /// by the service as a per-client `error` status.
    fn detect(&self, include_versions: bool) -> DetectFuture<'_>;
}
