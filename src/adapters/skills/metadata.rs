//! Descriptions extracted from skill manifests.
//!
//! The description is the first of:
//!
//! 1. `description` in YAML frontmatter
//! 2. the first non-empty line of the body that is not a heading
//! 3. the text of the first heading

use gray_matter::Matter;
use gray_matter::engine::YAML;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct SkillFrontmatter {
    description: Option<String>,
}

/// Describe a manifest.
///
/// Returns `Ok(None)` when the manifest has no usable text, and `Err` with
/// the parser message when frontmatter is present but not valid YAML.
pub(crate) fn describe(content: &str) -> Result<Option<String>, String> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<SkillFrontmatter>(content)
        .map_err(|e| format!("invalid frontmatter: {e}"))?;

    let from_frontmatter = parsed
        .data
        .and_then(|data| data.description)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if from_frontmatter.is_some() {
        return Ok(from_frontmatter);
    }

    let lines: Vec<&str> = parsed.content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let body = lines.iter().find(|line| !line.starts_with('#'));
    let heading = lines
        .iter()
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .filter(|text| !text.is_empty());

    Ok(body.copied().or(heading).map(ToString::to_string))
}
