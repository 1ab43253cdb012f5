//! Skill mutation payloads.
//!
//! ```json
//! { "manifest": "---\ndescription: Review a PR\n---\n# Review\n", "install_kind": "file" }
//! ```
//!
//! `add` and `update` take the manifest either inline (`manifest`) or from
//! disk (`source_path`: a directory holding `SKILL.md`, or a single `.md`
//! file). For `remove`, `source_path` may name the installed skill itself.

use crate::core::{EngineError, EngineResult, InstallKind, MutationAction, ResourceKind};
use serde::Deserialize;
use tracing::debug;

/// Where new manifest content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillSource {
    /// Manifest text supplied in the request
    Inline(String),
    /// Directory or `.md` file on disk, unexpanded
    Path(String),
}

/// Validated skill payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillPayload {
    /// Skills root overriding path inference
    pub skills_dir: Option<String>,
    /// New content, present for add and update
    pub source: Option<SkillSource>,
    /// Installed skill to remove, remove only
    pub installed_path: Option<String>,
    /// Requested layout
    pub install_kind: Option<InstallKind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPayload {
    skills_dir: Option<String>,
    source_path: Option<String>,
    manifest: Option<String>,
    install_kind: Option<InstallKind>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Reject names that would escape the skills root or hide the entry.
pub fn validate_skill_name(name: &str) -> EngineResult<()> {
    let invalid = |reason: &str| EngineError::invalid(ResourceKind::Skill, name, reason);
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(invalid("skill names must not contain `/`, `\\` or `..`"));
    }
    if name.starts_with('.') {
        return Err(invalid("skill names must not start with `.`"));
    }
    Ok(())
}

impl SkillPayload {
    /// Parse and validate the payload for `action` on skill `name`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown fields, for add/update without
    /// exactly one of `manifest` and `source_path`, or for blank manifests.
    pub fn parse(
        action: MutationAction,
        name: &str,
        payload: Option<&serde_json::Value>,
    ) -> EngineResult<Self> {
        let raw: RawPayload = match payload {
            None | Some(serde_json::Value::Null) => RawPayload::default(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                EngineError::invalid(ResourceKind::Skill, name, format!("payload: {e}"))
            })?,
        };
        let skills_dir = non_blank(raw.skills_dir);
        let source_path = non_blank(raw.source_path);

        if action == MutationAction::Remove {
            if raw.manifest.is_some() || raw.install_kind.is_some() {
                debug!("Ignoring manifest/install_kind in remove payload for '{}'", name);
            }
            return Ok(Self {
                skills_dir,
                source: None,
                installed_path: source_path,
                install_kind: None,
            });
        }

        let source = match (raw.manifest, source_path) {
            (Some(_), Some(_)) => {
                return Err(EngineError::invalid(
                    ResourceKind::Skill,
                    name,
                    "`manifest` and `source_path` are mutually exclusive",
                ));
            }
            (None, None) => {
                return Err(EngineError::invalid(
                    ResourceKind::Skill,
                    name,
                    format!("{action} needs `manifest` or `source_path`"),
                ));
            }
            (Some(manifest), None) if manifest.trim().is_empty() => {
                return Err(EngineError::invalid(ResourceKind::Skill, name, "`manifest` is empty"));
            }
            (Some(manifest), None) => SkillSource::Inline(manifest),
            (None, Some(path)) => SkillSource::Path(path),
        };

        Ok(Self {
            skills_dir,
            source: Some(source),
            installed_path: None,
            install_kind: raw.install_kind,
        })
    }
}
