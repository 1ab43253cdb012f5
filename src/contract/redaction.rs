//! Secret redaction for everything the command layer prints.
//!
//! Config files routinely carry credentials in `env`, `headers` or command
//! arguments, and error messages quote paths and values. Every string in an
//! envelope passes through [`redact`] before it reaches stdout.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Replacement text for a secret.
pub const REDACTED: &str = "[REDACTED]";

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                r#"(?i)(token|api[_-]?key|secret|password|access[_-]?key)=([^\s&"',;]+)"#,
                "${1}=[REDACTED]",
            ),
            (r"(?i)\bBearer\s+[A-Za-z0-9._~+/=-]+", "Bearer [REDACTED]"),
            (r"\b(?:sk-[A-Za-z0-9_-]{8,}|ghp_[A-Za-z0-9]{8,}|github_pat_[A-Za-z0-9_]{8,})", REDACTED),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|pattern| Rule {
                pattern,
                replacement,
            })
        })
        .collect()
    })
}

/// Mask credentials in `text`.
#[must_use]
pub fn redact(text: &str) -> String {
    let mut out = text.to_string();
    for rule in rules() {
        if rule.pattern.is_match(&out) {
            out = rule.pattern.replace_all(&out, rule.replacement).into_owned();
        }
    }
    out
}

/// Mask credentials in every string of a JSON tree, in place.
pub fn redact_value(value: &mut Value) {
    match value {
        Value::String(text) => {
            let masked = redact(text);
            if masked != *text {
                *text = masked;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        Value::Object(map) => map.values_mut().for_each(redact_value),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
