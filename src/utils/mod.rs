//! Cross-cutting helpers.
//!
//! - [`fs`]: atomic writes and whole-tree copy/remove used by the backup
//!   manager and the skill store

pub mod fs;
