use crate::common::{mutation, skill_manifest};
use ai_manager::core::{ClientKind, ErrorCategory, InstallKind, MutationAction, ResourceKind};
use ai_manager::service::ListRequest;
use ai_manager::test_utils::TestEnvironment;
use serde_json::json;
use std::fs;

fn list_skills(client: Option<ClientKind>) -> ListRequest {
    ListRequest {
        client,
        kind: ResourceKind::Skill,
        enabled: None,
    }
}

#[tokio::test]
async fn test_inline_manifest_installs_directory_skill() {
    let env = TestEnvironment::new().unwrap();
    let service = env.service();
    let manifest = skill_manifest("release-notes", "Draft release notes from merged PRs");

    let response = service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Skill,
            MutationAction::Add,
            "release-notes",
            Some(json!({ "manifest": manifest })),
        ))
        .await
        .unwrap();

    assert!(response.accepted);
    assert_eq!(env.read_file(".claude/skills/release-notes/SKILL.md").unwrap(), manifest);
    assert!(response.backup_path.is_none());

    let listing = service.list_resources(list_skills(Some(ClientKind::ClaudeCode))).await.unwrap();
    assert_eq!(listing.items.len(), 1);
    let skill = &listing.items[0];
    assert_eq!(skill.display_name, "release-notes");
    assert_eq!(skill.install_kind, Some(InstallKind::Directory));
    assert_eq!(skill.description.as_deref(), Some("Draft release notes from merged PRs"));
}

#[tokio::test]
async fn test_file_layout_is_honoured() {
    let env = TestEnvironment::new().unwrap();
    let service = env.service();

    service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Skill,
            MutationAction::Add,
            "lint",
            Some(json!({
                "manifest": "# Lint\n\nRun the linters before committing.\n",
                "install_kind": "file"
            })),
        ))
        .await
        .unwrap();

    assert!(env.exists(".cursor/skills/lint.md"));
    assert!(!env.exists(".cursor/skills/lint"));

    let listing = service.list_resources(list_skills(Some(ClientKind::Cursor))).await.unwrap();
    assert_eq!(listing.items[0].install_kind, Some(InstallKind::File));
    assert_eq!(listing.items[0].description.as_deref(), Some("Run the linters before committing."));
}

#[tokio::test]
async fn test_directory_source_is_copied_with_extra_files() {
    let env = TestEnvironment::new().unwrap();
    let source = env.root().join("src-skill");
    fs::create_dir_all(source.join("scripts")).unwrap();
    fs::write(source.join("SKILL.md"), skill_manifest("bench", "Run benchmarks")).unwrap();
    fs::write(source.join("scripts/run.sh"), "cargo bench\n").unwrap();
    let service = env.service();

    service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Skill,
            MutationAction::Add,
            "bench",
            Some(json!({ "source_path": source.to_string_lossy() })),
        ))
        .await
        .unwrap();

    assert_eq!(env.read_file(".codex/skills/bench/scripts/run.sh").unwrap(), "cargo bench\n");
    assert!(source.join("SKILL.md").exists());
}

#[tokio::test]
async fn test_duplicate_add_fails_in_either_layout() {
    let env = TestEnvironment::new().unwrap();
    let existing = skill_manifest("triage", "Triage issues");
    env.write_file(".claude/skills/triage.md", &existing).unwrap();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Skill,
            MutationAction::Add,
            "triage",
            Some(json!({ "manifest": skill_manifest("triage", "Other") })),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.to_string().contains("skill 'triage' already exists in"));
    assert_eq!(env.read_file(".claude/skills/triage.md").unwrap(), existing);
    assert!(!env.exists(".claude/skills/triage"));
}

#[tokio::test]
async fn test_update_rewrites_manifest_and_backs_up_previous() {
    let env = TestEnvironment::new().unwrap();
    let before = skill_manifest("triage", "Triage issues");
    env.write_file(".claude/skills/triage/SKILL.md", &before).unwrap();
    env.write_file(".claude/skills/triage/notes.txt", "keep me").unwrap();
    let service = env.service();
    let after = skill_manifest("triage", "Triage and label issues");

    let response = service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Skill,
            MutationAction::Update,
            "triage",
            Some(json!({ "manifest": after })),
        ))
        .await
        .unwrap();

    assert_eq!(env.read_file(".claude/skills/triage/SKILL.md").unwrap(), after);
    assert_eq!(env.read_file(".claude/skills/triage/notes.txt").unwrap(), "keep me");
    let backup = response.backup_path.unwrap();
    assert_eq!(fs::read_to_string(backup).unwrap(), before);
}

#[tokio::test]
async fn test_remove_deletes_directory_and_keeps_a_copy() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".codex/skills/old/SKILL.md", &skill_manifest("old", "Old skill")).unwrap();
    let service = env.service();

    let response = service
        .mutate_resource(mutation(
            ClientKind::CodexCli,
            ResourceKind::Skill,
            MutationAction::Remove,
            "old",
            None,
        ))
        .await
        .unwrap();

    assert!(!env.exists(".codex/skills/old"));
    let backup = response.backup_path.unwrap();
    assert!(backup.is_dir());
    assert!(backup.join("SKILL.md").is_file());
}

#[tokio::test]
async fn test_update_and_remove_of_missing_skill_fail() {
    let env = TestEnvironment::new().unwrap();
    fs::create_dir_all(env.home_path(".claude/skills")).unwrap();
    let service = env.service();

    for action in [MutationAction::Update, MutationAction::Remove] {
        let payload = (action == MutationAction::Update)
            .then(|| json!({ "manifest": skill_manifest("ghost", "Nothing") }));
        let err = service
            .mutate_resource(mutation(
                ClientKind::ClaudeCode,
                ResourceKind::Skill,
                action,
                "ghost",
                payload,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation, "{action}");
    }
}

#[tokio::test]
async fn test_both_layouts_warn_on_list_and_are_cleaned_up_by_remove() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".cursor/skills/dup/SKILL.md", &skill_manifest("dup", "Directory copy")).unwrap();
    env.write_file(".cursor/skills/dup.md", &skill_manifest("dup", "File copy")).unwrap();
    let service = env.service();

    let listing = service.list_resources(list_skills(Some(ClientKind::Cursor))).await.unwrap();
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].install_kind, Some(InstallKind::Directory));
    assert!(listing.warning.unwrap().contains("SKILL_DUPLICATE"));

    let response = service
        .mutate_resource(mutation(
            ClientKind::Cursor,
            ResourceKind::Skill,
            MutationAction::Remove,
            "dup",
            None,
        ))
        .await
        .unwrap();
    assert!(response.message.contains("cleaned up stale entry"));
    assert!(!env.exists(".cursor/skills/dup"));
    assert!(!env.exists(".cursor/skills/dup.md"));
    assert_eq!(env.backups_for(ClientKind::Cursor).unwrap().len(), 2);

    let listing = service.list_resources(list_skills(Some(ClientKind::Cursor))).await.unwrap();
    assert!(listing.items.is_empty());
}

#[tokio::test]
async fn test_remove_by_path_never_deletes_unrelated_directories() {
    let env = TestEnvironment::new().unwrap();
    env.write_file(".claude/skills/notes/SKILL.md", &skill_manifest("notes", "Real skill")).unwrap();
    let project = env.write_file("work/notes/src/main.rs", "fn main() {}\n").unwrap();
    env.write_file("work/notes/README.txt", "project\n").unwrap();
    let service = env.service();

    let err = service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Skill,
            MutationAction::Remove,
            "notes",
            Some(json!({ "source_path": env.home_path("work/notes").to_string_lossy() })),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(project.is_file());
    assert!(env.exists("work/notes/README.txt"));
    assert!(env.exists(".claude/skills/notes/SKILL.md"));
    assert!(env.backups_for(ClientKind::ClaudeCode).unwrap().is_empty());
}

#[tokio::test]
async fn test_unsafe_names_are_rejected() {
    let env = TestEnvironment::new().unwrap();
    let service = env.service();

    for name in ["../escape", "nested/skill", ".hidden"] {
        let err = service
            .mutate_resource(mutation(
                ClientKind::ClaudeCode,
                ResourceKind::Skill,
                MutationAction::Add,
                name,
                Some(json!({ "manifest": skill_manifest("x", "y") })),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation, "{name}");
    }
    assert!(!env.exists(".claude/skills"));
}

#[tokio::test]
async fn test_skills_dir_override_is_used() {
    let env = TestEnvironment::new().unwrap();
    let custom = env.root().join("shared-skills");
    env.env.set_var("AI_MANAGER_CLAUDE_CODE_SKILLS_DIR", custom.to_string_lossy());
    let service = env.service();

    service
        .mutate_resource(mutation(
            ClientKind::ClaudeCode,
            ResourceKind::Skill,
            MutationAction::Add,
            "review",
            Some(json!({ "manifest": skill_manifest("review", "Review a diff") })),
        ))
        .await
        .unwrap();

    assert!(custom.join("review/SKILL.md").is_file());
    assert!(!env.exists(".claude/skills"));
}
