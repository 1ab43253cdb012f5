//! MCP server entries in JSON and TOML client configs.
//!
//! Listing projects every well-formed entry of the MCP section to a
//! [`ResourceRecord`]; entries the client would not understand become
//! warnings. Mutations edit one entry in memory, re-render the whole
//! document and write it atomically. Before the write the file is re-read
//! and compared with the bytes that were validated, so a concurrent edit by
//! another program surfaces as a conflict instead of being overwritten.

mod document;
mod json_doc;
pub mod payload;
mod toml_doc;

pub use payload::{McpPayload, Transport};

use super::{
    AdapterListing, MutationContext, MutationOutcome, MutationRequest, blocked, happy_path,
    resolve_location,
};
use crate::backup::MutationTransaction;
use crate::core::{EngineError, EngineResult, MutationAction, ResourceKind, ResourceRecord};
use crate::detection::{LocationProbe, probe_location};
use crate::paths::{CandidateKind, ClientProfile, EnvSource, expand_path};
use crate::utils::fs::{atomic_write, ensure_dir};
use document::{EntryView, McpDocument, SectionView, parse_document};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file does not exist
pub const CONFIG_NOT_FOUND: &str = "CONFIG_NOT_FOUND";
/// Document has no MCP section
pub const MCP_SECTION_MISSING: &str = "MCP_SECTION_MISSING";
/// MCP section is not a map
pub const MCP_SECTION_INVALID: &str = "MCP_SECTION_INVALID";
/// Entry is not a map
pub const SERVER_ENTRY_INVALID: &str = "SERVER_ENTRY_INVALID";
/// Entry has neither `command` nor `url`
pub const SERVER_TRANSPORT_MISSING: &str = "SERVER_TRANSPORT_MISSING";

fn read_optional(path: &Path) -> EngineResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EngineError::io("reading", path, e)),
    }
}

fn decode<'a>(profile: &ClientProfile, path: &Path, bytes: &'a [u8]) -> EngineResult<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| EngineError::Parse {
        path: path.to_path_buf(),
        format: profile.mcp_format.name(),
        reason: format!("not valid UTF-8: {e}"),
    })
}

fn record(
    profile: &ClientProfile,
    path: &Path,
    name: String,
    enabled: bool,
    transport: Transport,
) -> ResourceRecord {
    let transport_kind = Some(transport.kind());
    let (transport_command, transport_args, transport_url) = match transport {
        Transport::Stdio { command, args, .. } => (Some(command), args, None),
        Transport::Sse { url, .. } => (None, Vec::new(), Some(url)),
    };
    ResourceRecord {
        id: ResourceRecord::mcp_id(profile.kind, &name),
        client: profile.kind,
        display_name: name,
        enabled,
        transport_kind,
        transport_command,
        transport_args,
        transport_url,
        source_path: path.to_path_buf(),
        description: None,
        install_kind: None,
    }
}

/// List MCP servers configured for `profile`'s client.
pub(crate) fn list(profile: &ClientProfile, env: &dyn EnvSource) -> EngineResult<AdapterListing> {
    let client = profile.kind;
    let path = match probe_location(profile, CandidateKind::McpConfig, env) {
        LocationProbe::Found { path, .. } => path,
        LocationProbe::NotFound => {
            let expected = happy_path(profile, CandidateKind::McpConfig, ResourceKind::Mcp, env)?;
            return Ok(AdapterListing::only_warning(
                client,
                CONFIG_NOT_FOUND,
                format!("No MCP config found for {client} (expected {})", expected.display()),
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
        other => return Err(blocked(&other, client, ResourceKind::Mcp)),
    };

    let bytes = fs::read(&path).map_err(|e| EngineError::io("reading", &path, e))?;
    let document = parse_document(profile.mcp_format, &path, decode(profile, &path, &bytes)?)?;

    let mut listing = AdapterListing::default();
    match document.section() {
        SectionView::Missing => listing.warn(
            client,
            MCP_SECTION_MISSING,
            format!("{} has no `{}` section", path.display(), document.section_key()),
        ),
        SectionView::Invalid => listing.warn(
            client,
            MCP_SECTION_INVALID,
            format!("`{}` in {} is not a table", document.section_key(), path.display()),
        ),
        SectionView::Entries(entries) => {
            for entry in entries {
                match entry {
                    EntryView::Server {
                        name,
                        enabled,
                        transport,
                    } => listing.items.push(record(profile, &path, name, enabled, transport)),
                    EntryView::NotAMap(name) => listing.warn(
                        client,
                        SERVER_ENTRY_INVALID,
                        format!("MCP server '{name}' in {} is not a table", path.display()),
                    ),
                    EntryView::NoTransport(name) => listing.warn(
                        client,
                        SERVER_TRANSPORT_MISSING,
                        format!(
                            "MCP server '{name}' in {} has neither `command` nor `url`",
                            path.display()
                        ),
                    ),
                }
            }
        }
    }

    debug!("Listed {} MCP server(s) for {} from {}", listing.items.len(), client, path.display());
    Ok(listing)
}

fn target_path(
    profile: &ClientProfile,
    request: &MutationRequest,
    source_path: Option<&str>,
    env: &dyn EnvSource,
) -> EngineResult<PathBuf> {
    let Some(raw) = source_path else {
        return resolve_location(profile, CandidateKind::McpConfig, request, env);
    };

    let path = expand_path(raw, env);
    if path.is_dir() {
        return Err(EngineError::invalid(
            ResourceKind::Mcp,
            &request.target_id,
            format!("source_path {} is a directory", path.display()),
        ));
    }
    if request.action != MutationAction::Add && !path.is_file() {
        return Err(EngineError::invalid(
            ResourceKind::Mcp,
            &request.target_id,
            format!("source_path {} does not exist", path.display()),
        ));
    }
    Ok(path)
}

/// Apply one MCP mutation for `profile`'s client.
pub(crate) fn mutate(
    profile: &ClientProfile,
    request: &MutationRequest,
    ctx: &MutationContext<'_>,
) -> EngineResult<MutationOutcome> {
    let name = request.target_id.as_str();
    let format = profile.mcp_format;
    let payload = McpPayload::parse(request.action, name, request.payload.as_ref())?;
    let path = target_path(profile, request, payload.source_path.as_deref(), ctx.env)?;

    let original = read_optional(&path)?;
    let text = match &original {
        Some(bytes) => decode(profile, &path, bytes)?,
        None => "",
    };
    let mut document = parse_document(format, &path, text)?;
    if document.section() == SectionView::Invalid {
        return Err(EngineError::Parse {
            path,
            format: format.name(),
            reason: format!("`{}` must be a table", document.section_key()),
        });
    }

    apply_in_memory(&mut *document, request, &payload, &path)?;
    let rendered = document.render().map_err(|reason| EngineError::Unknown {
        context: format!("rendering {}", path.display()),
        message: reason,
    })?;
    debug!("Validated {} of MCP server '{}' in {}", request.action, name, path.display());

    let mut tx = MutationTransaction::begin(ctx.backups, profile.kind, &path, ctx.faults)?;
    tx.apply(|target| {
        if read_optional(target)? != original {
            return Err(EngineError::Conflict {
                kind: ResourceKind::Mcp,
                name: name.to_string(),
                path: target.to_path_buf(),
            });
        }
        if let Some(parent) = target.parent() {
            ensure_dir(parent).map_err(|e| EngineError::io("creating directory", parent, e))?;
        }
        atomic_write(target, rendered.as_bytes()).map_err(|e| EngineError::io("writing", target, e))
    })?;
    tx.verify(|target| {
        let written = fs::read_to_string(target).map_err(|e| EngineError::io("re-reading", target, e))?;
        let reparsed = parse_document(format, target, &written)?;
        let expected = request.action != MutationAction::Remove;
        if reparsed.contains(name) == expected {
            Ok(())
        } else {
            Err(EngineError::Unknown {
                context: format!("verifying {}", target.display()),
                message: format!("MCP server '{name}' is not in the expected state after writing"),
            })
        }
    })?;
    let backup = tx.commit();

    let message = format!(
        "{} MCP server '{}' in {}",
        request.action.past_tense(),
        name,
        path.display()
    );
    info!("{}", message);
    Ok(MutationOutcome {
        accepted: true,
        message,
        source_path: path,
        backup,
    })
}

fn apply_in_memory(
    document: &mut dyn McpDocument,
    request: &MutationRequest,
    payload: &McpPayload,
    path: &Path,
) -> EngineResult<()> {
    let name = request.target_id.as_str();
    let exists = document.contains(name);

    let enabled = match request.action {
        MutationAction::Add if exists => {
            return Err(EngineError::AlreadyExists {
                kind: ResourceKind::Mcp,
                name: name.to_string(),
                location: path.to_path_buf(),
            });
        }
        MutationAction::Remove | MutationAction::Update if !exists => {
            return Err(EngineError::NotFound {
                kind: ResourceKind::Mcp,
                name: name.to_string(),
                location: path.to_path_buf(),
            });
        }
        MutationAction::Remove => {
            document.remove(name);
            return Ok(());
        }
        MutationAction::Add => payload.enabled.unwrap_or(true),
        MutationAction::Update => payload.enabled.or_else(|| document.enabled(name)).unwrap_or(true),
    };

    let transport = payload.transport.as_ref().ok_or_else(|| {
        EngineError::invalid(ResourceKind::Mcp, name, format!("transport is required for {}", request.action))
    })?;
    document.upsert(name, transport, enabled).map_err(|reason| EngineError::Parse {
        path: path.to_path_buf(),
        format: "MCP",
        reason,
    })
}
