//! The static Path Candidate Table: one [`ClientProfile`] row per client.
//!
//! Adding a client means adding a [`ClientKind`] variant and one row here;
//! detection and mutation pick it up through their registries.

use super::{CandidateKind, CandidateRole, ClientProfile, DetectorKind, McpFormat, PathCandidate};
use crate::core::ClientKind;

use CandidateKind::{McpConfig, SkillsDir};
use CandidateRole::{Fallback, HappyPath};

const fn candidate(
    kind: CandidateKind,
    role: CandidateRole,
    priority: u8,
    path_template: &'static str,
    override_env_var: &'static str,
) -> PathCandidate {
    PathCandidate {
        kind,
        role,
        priority,
        path_template,
        override_env_var,
    }
}

const CLAUDE_MCP_ENV: &str = "AI_MANAGER_CLAUDE_CODE_MCP_CONFIG";
const CLAUDE_SKILLS_ENV: &str = "AI_MANAGER_CLAUDE_CODE_SKILLS_DIR";
const CODEX_CLI_MCP_ENV: &str = "AI_MANAGER_CODEX_CLI_MCP_CONFIG";
const CODEX_CLI_SKILLS_ENV: &str = "AI_MANAGER_CODEX_CLI_SKILLS_DIR";
const CURSOR_MCP_ENV: &str = "AI_MANAGER_CURSOR_MCP_CONFIG";
const CURSOR_SKILLS_ENV: &str = "AI_MANAGER_CURSOR_SKILLS_DIR";
const CODEX_APP_MCP_ENV: &str = "AI_MANAGER_CODEX_APP_MCP_CONFIG";
const CODEX_APP_SKILLS_ENV: &str = "AI_MANAGER_CODEX_APP_SKILLS_DIR";

/// Every supported client, in registry order.
pub static CLIENT_PROFILES: [ClientProfile; 4] = [
    ClientProfile {
        kind: ClientKind::ClaudeCode,
        display_name: "Claude Code",
        detector_kind: DetectorKind::Cli,
        binaries: &["claude", "claude-code"],
        mcp_format: McpFormat::Json,
        candidates: &[
            candidate(McpConfig, HappyPath, 1, "~/.claude/claude_code_config.json", CLAUDE_MCP_ENV),
            candidate(McpConfig, Fallback, 2, "~/.claude.json", CLAUDE_MCP_ENV),
            candidate(SkillsDir, HappyPath, 1, "~/.claude/skills", CLAUDE_SKILLS_ENV),
        ],
    },
    ClientProfile {
        kind: ClientKind::CodexCli,
        display_name: "Codex CLI",
        detector_kind: DetectorKind::Cli,
        binaries: &["codex", "codex-cli"],
        mcp_format: McpFormat::Toml,
        candidates: &[
            candidate(McpConfig, HappyPath, 1, "~/.codex/config.toml", CODEX_CLI_MCP_ENV),
            candidate(SkillsDir, HappyPath, 1, "~/.codex/skills", CODEX_CLI_SKILLS_ENV),
        ],
    },
    ClientProfile {
        kind: ClientKind::Cursor,
        display_name: "Cursor",
        detector_kind: DetectorKind::Desktop,
        binaries: &["cursor", "Cursor"],
        mcp_format: McpFormat::Json,
        candidates: &[
            candidate(McpConfig, HappyPath, 1, "~/.cursor/mcp.json", CURSOR_MCP_ENV),
            candidate(
                McpConfig,
                Fallback,
                2,
                "~/Library/Application Support/Cursor/User/mcp.json",
                CURSOR_MCP_ENV,
            ),
            candidate(SkillsDir, HappyPath, 1, "~/.cursor/skills", CURSOR_SKILLS_ENV),
            candidate(
                SkillsDir,
                Fallback,
                2,
                "~/Library/Application Support/Cursor/User/skills",
                CURSOR_SKILLS_ENV,
            ),
        ],
    },
    ClientProfile {
        kind: ClientKind::CodexApp,
        display_name: "Codex App",
        detector_kind: DetectorKind::Desktop,
        binaries: &["codex-app", "Codex"],
        mcp_format: McpFormat::Json,
        candidates: &[
            candidate(
                McpConfig,
                HappyPath,
                1,
                "~/Library/Application Support/Codex/mcp.json",
                CODEX_APP_MCP_ENV,
            ),
            candidate(McpConfig, Fallback, 2, "~/.config/Codex/mcp.json", CODEX_APP_MCP_ENV),
            candidate(
                SkillsDir,
                HappyPath,
                1,
                "~/Library/Application Support/Codex/skills",
                CODEX_APP_SKILLS_ENV,
            ),
            candidate(SkillsDir, Fallback, 2, "~/.config/Codex/skills", CODEX_APP_SKILLS_ENV),
        ],
    },
];

/// Profile row for a client.
#[must_use]
pub fn profile(kind: ClientKind) -> &'static ClientProfile {
    // Rows are declared in `ClientKind::ALL` order.
    &CLIENT_PROFILES[kind as usize]
}
