//! Core types and error handling for ai-manager
//!
//! - [`client`]: identifiers for clients, resource kinds and mutation actions
//! - [`resource`]: the [`ResourceRecord`] projection produced by listings
//! - [`error`]: the [`EngineError`] taxonomy and terminal rendering helpers

pub mod client;
pub mod error;
pub mod resource;

pub use client::{ClientKind, MutationAction, ResourceKind};
pub use error::{EngineError, ErrorCategory, ErrorContext, user_friendly_error};
pub use resource::{InstallKind, ResourceRecord, TransportKind};

/// Result alias used by the engine layers below the command edge.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
