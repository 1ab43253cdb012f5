//! Error handling for ai-manager
//!
//! Every failure the engine can report is an [`EngineError`]. Each variant
//! belongs to exactly one [`ErrorCategory`], and the category decides the
//! canonical machine-readable code and whether the caller can recover by
//! retrying or correcting the request.
//!
//! # Categories
//!
//! | Category | Code | Recoverable |
//! |---|---|---|
//! | `parse` | `PARSE_ERROR` | no, the document needs manual repair |
//! | `permission` | `PERMISSION_DENIED` | yes |
//! | `validation` | `VALIDATION_ERROR` | yes, by correcting the request |
//! | `conflict` | `CONFLICT` | yes |
//! | `io` | `IO_ERROR` | yes |
//! | `unknown` | `UNKNOWN_ERROR` | no |
//!
//! Errors are categorized where they happen and travel unchanged to the
//! service boundary. A failure that happens after a backup was taken is
//! wrapped in [`EngineError::RolledBack`], which keeps the category of the
//! underlying failure and adds the rollback outcome.
//!
//! [`ErrorContext`] and [`user_friendly_error`] render errors for terminal
//! users when no JSON envelope can be produced (for example when the engine
//! configuration itself is unreadable).

use crate::backup::MutationStage;
use crate::core::client::{ClientKind, ResourceKind};
use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse classification shared by every [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Document is malformed for its format
    Parse,
    /// Filesystem denied a read or write
    Permission,
    /// Request violates a contract invariant
    Validation,
    /// Target changed between validation and write
    Conflict,
    /// Any other filesystem or process failure
    Io,
    /// Unclassified
    Unknown,
}

impl ErrorCategory {
    /// Canonical error code exposed to callers.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Parse => "PARSE_ERROR",
            Self::Permission => "PERMISSION_DENIED",
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::Io => "IO_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Whether the caller can recover without editing files by hand.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        match self {
            Self::Permission | Self::Io | Self::Validation | Self::Conflict => true,
            Self::Parse | Self::Unknown => false,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parse => "parse",
            Self::Permission => "permission",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Io => "io",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The main error type for engine operations.
///
/// Messages always name the resource or path involved so that a caller
/// never sees a bare "operation failed".
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration document could not be parsed
    #[error("Failed to parse {format} config at {}: {reason}", path.display())]
    Parse {
        /// Document that failed to parse
        path: PathBuf,
        /// Format name (`JSON`, `TOML`, ...)
        format: &'static str,
        /// Parser message
        reason: String,
    },

    /// The filesystem refused access
    #[error("Permission denied while {operation} {}", path.display())]
    PermissionDenied {
        /// What the engine was doing (`reading`, `writing`, ...)
        operation: String,
        /// Path that was refused
        path: PathBuf,
    },

    /// `add` targeted an entry that already exists
    #[error("{} '{name}' already exists in {}", kind.label(), location.display())]
    AlreadyExists {
        /// Resource kind
        kind: ResourceKind,
        /// Entry name
        name: String,
        /// Config file or skills directory
        location: PathBuf,
    },

    /// `remove` or `update` targeted an entry that does not exist
    #[error("{} '{name}' does not exist in {}", kind.label(), location.display())]
    NotFound {
        /// Resource kind
        kind: ResourceKind,
        /// Entry name
        name: String,
        /// Config file or skills directory
        location: PathBuf,
    },

    /// The mutation request itself is malformed
    #[error("Invalid {} request for '{name}': {reason}", kind.label())]
    InvalidRequest {
        /// Resource kind
        kind: ResourceKind,
        /// Target id as supplied
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A client, kind or action string was not recognised
    #[error("Unsupported {field} '{value}' (expected one of: {expected})")]
    UnsupportedValue {
        /// Which field was wrong
        field: &'static str,
        /// Value as supplied
        value: String,
        /// Accepted values
        expected: String,
    },

    /// No configuration location could be resolved for a mutation
    #[error("Cannot resolve {} location for {client}: {reason}", kind.label())]
    Unresolved {
        /// Client being mutated
        client: ClientKind,
        /// Resource kind
        kind: ResourceKind,
        /// Why resolution failed
        reason: String,
    },

    /// The target changed on disk after it was validated
    #[error(
        "{} changed on disk while applying {} '{name}'; the change was not kept",
        path.display(),
        kind.label()
    )]
    Conflict {
        /// Resource kind
        kind: ResourceKind,
        /// Entry name
        name: String,
        /// File that changed underneath the mutation
        path: PathBuf,
    },

    /// Any other filesystem or process failure
    #[error("I/O error while {operation} {}: {source}", path.display())]
    Io {
        /// What the engine was doing
        operation: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Unclassified failure
    #[error("Unexpected failure while {context}: {message}")]
    Unknown {
        /// What the engine was doing
        context: String,
        /// Free-form detail
        message: String,
    },

    /// A mutation failed after its backup was taken and was rolled back
    #[error("{source} ({})", rollback_note(*stage, *restored, backup_path.as_deref()))]
    RolledBack {
        /// The failure that triggered the rollback
        source: Box<EngineError>,
        /// Last stage the mutation reached
        stage: MutationStage,
        /// Whether the original state was restored
        restored: bool,
        /// Backup kept for manual recovery
        backup_path: Option<PathBuf>,
    },
}

fn rollback_note(stage: MutationStage, restored: bool, backup: Option<&Path>) -> String {
    let mut note = if restored {
        format!("rolled back after {stage}")
    } else {
        format!("rollback after {stage} FAILED")
    };
    if let Some(backup) = backup {
        note.push_str(&format!("; backup kept at {}", backup.display()));
    }
    note
}

impl EngineError {
    /// Build an I/O error, classifying `PermissionDenied` as a permission failure.
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                operation: operation.into(),
                path: path.into(),
            }
        } else {
            Self::Io {
                operation: operation.into(),
                path: path.into(),
                source,
            }
        }
    }

    /// Shorthand for [`EngineError::InvalidRequest`].
    pub fn invalid(kind: ResourceKind, name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            kind,
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Category of this error. [`EngineError::RolledBack`] reports the
    /// category of the failure it wraps.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse { .. } => ErrorCategory::Parse,
            Self::PermissionDenied { .. } => ErrorCategory::Permission,
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::InvalidRequest { .. }
            | Self::UnsupportedValue { .. }
            | Self::Unresolved { .. } => ErrorCategory::Validation,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Io { .. } => ErrorCategory::Io,
            Self::Unknown { .. } => ErrorCategory::Unknown,
            Self::RolledBack { source, .. } => source.category(),
        }
    }

    /// Canonical code of this error's category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.category().code()
    }

    /// Whether the caller can recover by retrying or correcting the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::RolledBack { restored: false, .. } => false,
            _ => self.category().is_recoverable(),
        }
    }

    /// Backup that survives this failure, if one was taken.
    #[must_use]
    pub fn backup_path(&self) -> Option<&Path> {
        match self {
            Self::RolledBack { backup_path, .. } => backup_path.as_deref(),
            _ => None,
        }
    }
}

/// User-facing wrapper adding details and an actionable suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a category-specific hint.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = error.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ");

    if let Some(engine) = error.downcast_ref::<EngineError>() {
        let ctx = ErrorContext::new(message).with_details(format!(
            "category: {} ({})",
            engine.category(),
            engine.code()
        ));
        return match engine.category() {
            ErrorCategory::Parse => ctx.with_suggestion(match engine.backup_path() {
                Some(backup) => format!(
                    "Fix the document by hand or restore it from {}",
                    backup.display()
                ),
                None => "Fix the document syntax by hand; ai-manager never rewrites a malformed file"
                    .to_string(),
            }),
            ErrorCategory::Permission => {
                ctx.with_suggestion("Check file ownership and permissions, then retry")
            }
            ErrorCategory::Validation => ctx.with_suggestion("Correct the request and retry"),
            ErrorCategory::Conflict => {
                ctx.with_suggestion("Another program changed the file; retry the mutation")
            }
            ErrorCategory::Io | ErrorCategory::Unknown => ctx,
        };
    }

    if let Some(io_error) = error.downcast_ref::<io::Error>() {
        if io_error.kind() == io::ErrorKind::PermissionDenied {
            return ErrorContext::new(message)
                .with_suggestion("Check file ownership and permissions, then retry");
        }
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(message)
            .with_suggestion("Check the TOML syntax of ~/.ai-manager/config.toml");
    }

    ErrorContext::new(message)
}
