//! The envelope every command prints.
//!
//! ```json
//! {
//!   "ok": false,
//!   "data": null,
//!   "error": {
//!     "code": "VALIDATION_ERROR",
//!     "message": "MCP server 'github' already exists in /home/u/.cursor/mcp.json",
//!     "recoverable": true
//!   },
//!   "meta": {
//!     "operation_id": "mutate-6f1c…",
//!     "lifecycle": { "phase": "failed", "started_at_ms": 1760000000000, "finished_at_ms": 1760000000004, "duration_ms": 4 }
//!   }
//! }
//! ```
//!
//! The engine never builds envelopes itself; the command layer maps results
//! and [`EngineError`]s into them through an [`OperationTracker`].

pub mod redaction;

pub use redaction::{redact, redact_value};

use crate::core::EngineError;
use serde::Serialize;
use std::path::PathBuf;

/// Structured error inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandError {
    /// Canonical category code
    pub code: String,
    /// Redacted message
    pub message: String,
    /// Whether retrying or correcting the request can succeed
    pub recoverable: bool,
    /// Backup to restore from by hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

impl From<&EngineError> for CommandError {
    fn from(error: &EngineError) -> Self {
        Self {
            code: error.code().to_string(),
            message: redact(&error.to_string()),
            recoverable: error.is_recoverable(),
            backup_path: error.backup_path().map(PathBuf::from),
        }
    }
}

/// Where an operation is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Still running
    Started,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

/// Timing snapshot attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleSnapshot {
    /// Current phase
    pub phase: LifecyclePhase,
    /// Unix milliseconds at start
    pub started_at_ms: i64,
    /// Unix milliseconds at finish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<i64>,
    /// Elapsed milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

/// Call metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandMeta {
    /// `<command>-<uuid>`
    pub operation_id: String,
    /// Timing
    pub lifecycle: LifecycleSnapshot,
}

/// Uniform result of one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandEnvelope<T: Serialize> {
    /// Success flag
    pub ok: bool,
    /// Payload on success
    pub data: Option<T>,
    /// Error on failure
    pub error: Option<CommandError>,
    /// Call metadata
    pub meta: CommandMeta,
}

impl<T: Serialize> CommandEnvelope<T> {
    /// Render as pretty JSON with every string redacted.
    ///
    /// # Errors
    ///
    /// Fails only if `T` cannot be represented as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(self)?;
        redact_value(&mut value);
        serde_json::to_string_pretty(&value)
    }
}

/// Tracks one command from start to envelope.
#[derive(Debug, Clone)]
pub struct OperationTracker {
    operation_id: String,
    started_at_ms: i64,
}

impl OperationTracker {
    /// Start tracking `command`.
    #[must_use]
    pub fn start(command: &str) -> Self {
        let tracker = Self {
            operation_id: format!("{command}-{}", uuid::Uuid::new_v4()),
            started_at_ms: chrono::Utc::now().timestamp_millis(),
        };
        tracing::debug!("Operation {} started", tracker.operation_id);
        tracker
    }

    /// Identifier of this operation.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Snapshot while still running.
    #[must_use]
    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            phase: LifecyclePhase::Started,
            started_at_ms: self.started_at_ms,
            finished_at_ms: None,
            duration_ms: None,
        }
    }

    fn finish(self, phase: LifecyclePhase) -> CommandMeta {
        let finished = chrono::Utc::now().timestamp_millis().max(self.started_at_ms);
        tracing::debug!("Operation {} {:?} in {} ms", self.operation_id, phase, finished - self.started_at_ms);
        CommandMeta {
            operation_id: self.operation_id,
            lifecycle: LifecycleSnapshot {
                phase,
                started_at_ms: self.started_at_ms,
                finished_at_ms: Some(finished),
                duration_ms: Some(finished - self.started_at_ms),
            },
        }
    }

    /// Successful envelope carrying `data`.
    pub fn succeed<T: Serialize>(self, data: T) -> CommandEnvelope<T> {
        CommandEnvelope {
            ok: true,
            data: Some(data),
            error: None,
            meta: self.finish(LifecyclePhase::Completed),
        }
    }

    /// Failed envelope describing `error`.
    pub fn fail<T: Serialize>(self, error: &EngineError) -> CommandEnvelope<T> {
        CommandEnvelope {
            ok: false,
            data: None,
            error: Some(CommandError::from(error)),
            meta: self.finish(LifecyclePhase::Failed),
        }
    }
}
