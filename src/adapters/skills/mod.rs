//! Skills stored as manifests under a client's skills directory.
//!
//! Two layouts are recognised:
//!
//! ```text
//! <skills_dir>/<name>/SKILL.md    directory skill (may carry extra files)
//! <skills_dir>/<name>.md          file skill
//! ```
//!
//! A name installed in both layouts is ambiguous: listing keeps the
//! directory and warns, `update` refuses to guess and `remove` deletes both.
//!
//! Removal only ever touches an installed skill: a path given with `remove`
//! must be one of the two layouts under the resolved skills root and must
//! carry its manifest.

mod metadata;
pub mod payload;

pub use payload::{SkillPayload, SkillSource, validate_skill_name};

use super::{
    AdapterListing, MutationContext, MutationOutcome, MutationRequest, blocked, happy_path,
    resolve_location,
};
use crate::backup::MutationTransaction;
use crate::constants::SKILL_MANIFEST_FILE;
use crate::core::{EngineError, EngineResult, InstallKind, MutationAction, ResourceKind, ResourceRecord};
use crate::detection::{LocationProbe, probe_location};
use crate::paths::{CandidateKind, ClientProfile, EnvSource, expand_path};
use crate::utils::fs::{atomic_write, copy_dir_all, ensure_dir, remove_path};
use metadata::describe;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Skills directory does not exist
pub const CONFIG_NOT_FOUND: &str = super::mcp::CONFIG_NOT_FOUND;
/// Manifest could not be read or has invalid frontmatter
pub const SKILL_MANIFEST_INVALID: &str = "SKILL_MANIFEST_INVALID";
/// Same name installed as directory and file
pub const SKILL_DUPLICATE: &str = "SKILL_DUPLICATE";

/// Where a named skill lives (or would live) under a root.
#[derive(Debug, Clone)]
struct Layouts {
    dir: PathBuf,
    file: PathBuf,
}

impl Layouts {
    fn new(root: &Path, name: &str) -> Self {
        Self {
            dir: root.join(name),
            file: root.join(format!("{name}.md")),
        }
    }

    fn path(&self, kind: InstallKind) -> &Path {
        match kind {
            InstallKind::Directory => &self.dir,
            InstallKind::File => &self.file,
        }
    }

    fn manifest(&self, kind: InstallKind) -> PathBuf {
        match kind {
            InstallKind::Directory => self.dir.join(SKILL_MANIFEST_FILE),
            InstallKind::File => self.file.clone(),
        }
    }

    /// Layouts that hold a manifest. A directory without `SKILL.md` is not a
    /// skill and is never touched.
    fn installed(&self) -> Vec<InstallKind> {
        let mut kinds = Vec::new();
        if self.manifest(InstallKind::Directory).is_file() {
            kinds.push(InstallKind::Directory);
        }
        if self.file.is_file() {
            kinds.push(InstallKind::File);
        }
        kinds
    }
}

fn skill_record(
    profile: &ClientProfile,
    name: &str,
    kind: InstallKind,
    path: PathBuf,
    description: Option<String>,
) -> ResourceRecord {
    ResourceRecord {
        id: ResourceRecord::skill_id(profile.kind, name),
        client: profile.kind,
        display_name: name.to_string(),
        enabled: true,
        transport_kind: None,
        transport_command: None,
        transport_args: Vec::new(),
        transport_url: None,
        source_path: path,
        description,
        install_kind: Some(kind),
    }
}

/// List skills installed for `profile`'s client.
pub(crate) fn list(profile: &ClientProfile, env: &dyn EnvSource) -> EngineResult<AdapterListing> {
    let client = profile.kind;
    let root = match probe_location(profile, CandidateKind::SkillsDir, env) {
        LocationProbe::Found { path, .. } => path,
        LocationProbe::NotFound => {
            let expected = happy_path(profile, CandidateKind::SkillsDir, ResourceKind::Skill, env)?;
            return Ok(AdapterListing::only_warning(
                client,
                CONFIG_NOT_FOUND,
                format!("No skills directory found for {client} (expected {})", expected.display()),
            ));
        }
        LocationProbe::OverrideMissing { path, env_var } => {
            return Ok(AdapterListing::only_warning(
                client,
                CONFIG_NOT_FOUND,
                format!("{env_var} points at {} which does not exist", path.display()),
            ));
        }
        LocationProbe::OverrideUnusable {
            path,
            env_var,
            reason,
        } => {
            return Ok(AdapterListing::only_warning(
                client,
                CONFIG_NOT_FOUND,
                format!("{env_var} points at {} which cannot be used: {reason}", path.display()),
            ));
        }
        other => return Err(blocked(&other, client, ResourceKind::Skill)),
    };

    let mut entries: Vec<PathBuf> = fs::read_dir(&root)
        .map_err(|e| EngineError::io("reading", &root, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let mut listing = AdapterListing::default();
    let mut found: BTreeMap<String, ResourceRecord> = BTreeMap::new();

    for path in entries {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }

        let (name, kind, manifest) = if path.is_dir() {
            let manifest = path.join(SKILL_MANIFEST_FILE);
            if !manifest.is_file() {
                debug!("Skipping {}: no {}", path.display(), SKILL_MANIFEST_FILE);
                continue;
            }
            (file_name, InstallKind::Directory, manifest)
        } else if path.extension().is_some_and(|ext| ext == "md") {
            let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            (stem, InstallKind::File, path.clone())
        } else {
            continue;
        };

        let description = match fs::read_to_string(&manifest) {
            Ok(content) => match describe(&content) {
                Ok(description) => description,
                Err(reason) => {
                    listing.warn(
                        client,
                        SKILL_MANIFEST_INVALID,
                        format!("{}: {reason}", manifest.display()),
                    );
                    None
                }
            },
            Err(e) => {
                listing.warn(
                    client,
                    SKILL_MANIFEST_INVALID,
                    format!("Cannot read {}: {e}", manifest.display()),
                );
                continue;
            }
        };

        if let Some(existing) = found.get(&name) {
            listing.warn(
                client,
                SKILL_DUPLICATE,
                format!(
                    "Skill '{name}' is installed as both {} and {}; listing the directory",
                    existing.source_path.display(),
                    path.display()
                ),
            );
            if existing.install_kind == Some(InstallKind::Directory) {
                continue;
            }
        }
        found.insert(name.clone(), skill_record(profile, &name, kind, path, description));
    }

    listing.items = found.into_values().collect();
    debug!("Listed {} skill(s) for {} from {}", listing.items.len(), client, root.display());
    Ok(listing)
}

/// How the new content gets onto disk.
enum Change {
    /// Write manifest text to a file
    Manifest { path: PathBuf, content: String },
    /// Replace the target directory with a copy of `source`
    CopyDir { source: PathBuf },
    /// Delete the target
    Delete,
}

struct Plan {
    /// Snapshot and rollback unit
    target: PathBuf,
    /// Installed skill reported back to the caller
    installed: PathBuf,
    /// Manifest that must exist afterwards (absent for remove)
    manifest: Option<PathBuf>,
    change: Change,
}

/// Manifest content and shape of a source.
struct Source {
    kind: Option<InstallKind>,
    content: String,
    dir: Option<PathBuf>,
}

fn load_source(name: &str, source: &SkillSource, env: &dyn EnvSource) -> EngineResult<Source> {
    let invalid = |reason: String| EngineError::invalid(ResourceKind::Skill, name, reason);
    let source = match source {
        SkillSource::Inline(content) => Source {
            kind: None,
            content: content.clone(),
            dir: None,
        },
        SkillSource::Path(raw) => {
            let path = expand_path(raw, env);
            if path.is_dir() {
                let manifest = path.join(SKILL_MANIFEST_FILE);
                if !manifest.is_file() {
                    return Err(invalid(format!(
                        "source_path {} has no {SKILL_MANIFEST_FILE}",
                        path.display()
                    )));
                }
                Source {
                    kind: Some(InstallKind::Directory),
                    content: fs::read_to_string(&manifest)
                        .map_err(|e| EngineError::io("reading", &manifest, e))?,
                    dir: Some(path),
                }
            } else if path.is_file() {
                if path.extension().is_none_or(|ext| ext != "md") {
                    return Err(invalid(format!("source_path {} is not a .md file", path.display())));
                }
                Source {
                    kind: Some(InstallKind::File),
                    content: fs::read_to_string(&path)
                        .map_err(|e| EngineError::io("reading", &path, e))?,
                    dir: None,
                }
            } else {
                return Err(invalid(format!("source_path {} does not exist", path.display())));
            }
        }
    };

    match describe(&source.content) {
        Ok(Some(_)) => Ok(source),
        Ok(None) => Err(invalid("manifest has no description, heading or text".to_string())),
        Err(reason) => Err(invalid(format!("manifest {reason}"))),
    }
}

fn skills_root(
    profile: &ClientProfile,
    request: &MutationRequest,
    skills_dir: Option<&str>,
    env: &dyn EnvSource,
) -> EngineResult<PathBuf> {
    let Some(raw) = skills_dir else {
        return resolve_location(profile, CandidateKind::SkillsDir, request, env);
    };
    let root = expand_path(raw, env);
    if root.is_file() {
        return Err(EngineError::invalid(
            ResourceKind::Skill,
            &request.target_id,
            format!("skills_dir {} is a file", root.display()),
        ));
    }
    if request.action != MutationAction::Add && !root.is_dir() {
        return Err(EngineError::NotFound {
            kind: ResourceKind::Skill,
            name: request.target_id.clone(),
            location: root,
        });
    }
    Ok(root)
}

fn plan_add(
    name: &str,
    layouts: &Layouts,
    root: &Path,
    source: Source,
    requested: Option<InstallKind>,
) -> EngineResult<Plan> {
    if let Some(existing) = layouts.installed().first() {
        return Err(EngineError::AlreadyExists {
            kind: ResourceKind::Skill,
            name: name.to_string(),
            location: layouts.path(*existing).to_path_buf(),
        });
    }
    debug!("Adding skill '{}' under {}", name, root.display());

    let kind = match (source.kind, requested) {
        (Some(shape), Some(requested)) if shape != requested => {
            return Err(EngineError::invalid(
                ResourceKind::Skill,
                name,
                format!(
                    "install_kind {} does not match the {} source",
                    requested.as_str(),
                    shape.as_str()
                ),
            ));
        }
        (Some(shape), _) => shape,
        (None, requested) => requested.unwrap_or(InstallKind::Directory),
    };

    let target = layouts.path(kind).to_path_buf();
    if target.exists() {
        return Err(EngineError::invalid(
            ResourceKind::Skill,
            name,
            format!("{} already exists and is not a skill", target.display()),
        ));
    }
    let manifest = layouts.manifest(kind);
    let change = match source.dir {
        Some(dir) => Change::CopyDir { source: dir },
        None => Change::Manifest {
            path: manifest.clone(),
            content: source.content,
        },
    };
    Ok(Plan {
        installed: target.clone(),
        target,
        manifest: Some(manifest),
        change,
    })
}

fn single_layout(name: &str, layouts: &Layouts, root: &Path) -> EngineResult<InstallKind> {
    match layouts.installed().as_slice() {
        [kind] => Ok(*kind),
        [] => Err(EngineError::NotFound {
            kind: ResourceKind::Skill,
            name: name.to_string(),
            location: root.to_path_buf(),
        }),
        _ => Err(EngineError::invalid(
            ResourceKind::Skill,
            name,
            format!(
                "installed as both {} and {}; remove stale entries first",
                layouts.dir.display(),
                layouts.file.display()
            ),
        )),
    }
}

fn plan_update(
    name: &str,
    layouts: &Layouts,
    root: &Path,
    source: Source,
    requested: Option<InstallKind>,
) -> EngineResult<Plan> {
    let kind = single_layout(name, layouts, root)?;
    if let Some(requested) = requested {
        if requested != kind {
            return Err(EngineError::invalid(
                ResourceKind::Skill,
                name,
                format!(
                    "install_kind {} does not match the installed {} layout",
                    requested.as_str(),
                    kind.as_str()
                ),
            ));
        }
    }

    let installed = layouts.path(kind).to_path_buf();
    let manifest = layouts.manifest(kind);
    match source.dir {
        Some(_) if kind == InstallKind::File => Err(EngineError::invalid(
            ResourceKind::Skill,
            name,
            "a directory source cannot update a file skill",
        )),
        Some(dir) => Ok(Plan {
            target: installed.clone(),
            installed,
            manifest: Some(manifest),
            change: Change::CopyDir { source: dir },
        }),
        None => Ok(Plan {
            target: manifest.clone(),
            installed,
            manifest: Some(manifest.clone()),
            change: Change::Manifest {
                path: manifest,
                content: source.content,
            },
        }),
    }
}

fn delete(target: &Path) -> Plan {
    Plan {
        target: target.to_path_buf(),
        installed: target.to_path_buf(),
        manifest: None,
        change: Change::Delete,
    }
}

/// Every installed layout of `name`, directory first.
fn plan_remove(name: &str, layouts: &Layouts, root: &Path) -> EngineResult<Vec<Plan>> {
    let installed = layouts.installed();
    if installed.is_empty() {
        return Err(EngineError::NotFound {
            kind: ResourceKind::Skill,
            name: name.to_string(),
            location: root.to_path_buf(),
        });
    }
    Ok(installed.into_iter().map(|kind| delete(layouts.path(kind))).collect())
}

/// Remove the layout at an explicit path.
///
/// The path may name the skill directory, its `SKILL.md`, or the file skill,
/// and must resolve to one of `layouts` under the skills root.
fn plan_remove_exact(name: &str, raw: &str, layouts: &Layouts, env: &dyn EnvSource) -> EngineResult<Plan> {
    let path = expand_path(raw, env);
    let rejected = |why: &str| {
        EngineError::invalid(
            ResourceKind::Skill,
            name,
            format!("source_path {} {why}", path.display()),
        )
    };
    let Ok(resolved) = fs::canonicalize(&path) else {
        return Err(rejected("does not exist"));
    };
    let same = |candidate: &Path| fs::canonicalize(candidate).is_ok_and(|c| c == resolved);

    let kind = if same(layouts.dir.as_path())
        || same(layouts.manifest(InstallKind::Directory).as_path())
    {
        InstallKind::Directory
    } else if same(layouts.file.as_path()) {
        InstallKind::File
    } else {
        return Err(rejected(
            format!("is not an installed skill named '{name}' in this skills directory").as_str(),
        ));
    };
    if !layouts.manifest(kind).is_file() {
        return Err(rejected(format!("has no {SKILL_MANIFEST_FILE}").as_str()));
    }
    Ok(delete(layouts.path(kind)))
}

fn perform(change: &Change, target: &Path) -> EngineResult<()> {
    match change {
        Change::Manifest { path, content } => {
            if let Some(parent) = path.parent() {
                ensure_dir(parent).map_err(|e| EngineError::io("creating directory", parent, e))?;
            }
            atomic_write(path, content.as_bytes()).map_err(|e| EngineError::io("writing", path, e))
        }
        Change::CopyDir { source } => {
            remove_path(target).map_err(|e| EngineError::io("replacing", target, e))?;
            copy_dir_all(source, target)
                .map_err(|e| EngineError::io(format!("copying {} to", source.display()), target, e))
        }
        Change::Delete => remove_path(target).map_err(|e| EngineError::io("removing", target, e)),
    }
}

/// Apply one skill mutation for `profile`'s client.
pub(crate) fn mutate(
    profile: &ClientProfile,
    request: &MutationRequest,
    ctx: &MutationContext<'_>,
) -> EngineResult<MutationOutcome> {
    let name = request.target_id.as_str();
    validate_skill_name(name)?;
    let payload = SkillPayload::parse(request.action, name, request.payload.as_ref())?;

    let root = skills_root(profile, request, payload.skills_dir.as_deref(), ctx.env)?;
    let layouts = Layouts::new(&root, name);
    let plans = match (request.action, payload.installed_path.as_deref()) {
        (MutationAction::Remove, Some(installed)) => {
            vec![plan_remove_exact(name, installed, &layouts, ctx.env)?]
        }
        (MutationAction::Remove, None) => plan_remove(name, &layouts, &root)?,
        (action, _) => {
            let Some(source) = &payload.source else {
                return Err(EngineError::invalid(
                    ResourceKind::Skill,
                    name,
                    format!("{action} needs `manifest` or `source_path`"),
                ));
            };
            let source = load_source(name, source, ctx.env)?;
            let plan = if action == MutationAction::Add {
                plan_add(name, &layouts, &root, source, payload.install_kind)?
            } else {
                plan_update(name, &layouts, &root, source, payload.install_kind)?
            };
            vec![plan]
        }
    };
    for plan in &plans {
        debug!("Validated {} of skill '{}' at {}", request.action, name, plan.installed.display());
    }

    // All snapshots are taken before anything changes; an early return drops
    // the remaining transactions, which restores what they cover.
    let mut transactions = Vec::with_capacity(plans.len());
    for plan in &plans {
        transactions.push(MutationTransaction::begin(ctx.backups, profile.kind, &plan.target, ctx.faults)?);
    }
    for (tx, plan) in transactions.iter_mut().zip(&plans) {
        tx.apply(|target| {
            if let Some(parent) = target.parent() {
                ensure_dir(parent).map_err(|e| EngineError::io("creating directory", parent, e))?;
            }
            perform(&plan.change, target)
        })?;
        tx.verify(|target| check_applied(name, plan, target))?;
    }
    let mut backups = transactions.into_iter().map(MutationTransaction::commit);
    let backup = backups.next().flatten();
    for extra in backups.flatten() {
        debug!("Stale entry backed up to {}", extra.backup_path.display());
    }

    let installed = plans[0].installed.clone();
    let mut message = format!("{} skill '{}' at {}", request.action.past_tense(), name, installed.display());
    if plans.len() > 1 {
        let stale: Vec<String> = plans[1..].iter().map(|p| p.installed.display().to_string()).collect();
        message = format!("{message} and cleaned up stale entry {}", stale.join(", "));
    }
    info!("{}", message);
    Ok(MutationOutcome {
        accepted: true,
        message,
        source_path: installed,
        backup,
    })
}

fn check_applied(name: &str, plan: &Plan, target: &Path) -> EngineResult<()> {
    let ok = match &plan.manifest {
        Some(manifest) => manifest.is_file(),
        None => !target.exists(),
    };
    if ok {
        Ok(())
    } else {
        Err(EngineError::Unknown {
            context: format!("verifying {}", target.display()),
            message: format!("skill '{name}' is not in the expected state after writing"),
        })
    }
}
