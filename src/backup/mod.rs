//! Backup management for configuration mutations.
//!
//! Before any destructive write the target file or directory is copied to
//!
//! ```text
//! <backup_root>/<client>/<original_name>.<timestamp_ms>.bak
//! ```
//!
//! The backup root lives outside every client's configuration tree
//! (`~/.ai-manager/backups` by default). Names are claimed with
//! create-new semantics and the timestamp is bumped on collision, so two
//! backups of the same file never overwrite each other. Backups are never
//! pruned by the engine.
//!
//! [`MutationTransaction`] drives the backup, write and rollback sequence for
//! a single mutation.

pub mod transaction;

pub use transaction::{FaultInjection, MutationStage, MutationTransaction};

use crate::constants::BACKUP_EXTENSION;
use crate::core::{ClientKind, EngineError, EngineResult};
use crate::utils::fs::{atomic_write, copy_dir_all, ensure_dir, remove_path};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A backup taken immediately before a destructive write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    /// File or directory that was backed up
    pub original_path: PathBuf,
    /// Where the copy lives
    pub backup_path: PathBuf,
    /// Millisecond timestamp encoded in the backup name
    pub created_at_ms: i64,
    /// Whether the original is a directory
    pub is_dir: bool,
}

/// Creates and restores backups under one root directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    root: PathBuf,
}

impl BackupManager {
    /// Manager storing backups under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Backup root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `path` into the backup root and return the record.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not exist or cannot be read, or if the backup
    /// directory cannot be written.
    pub fn backup(&self, client: ClientKind, path: &Path) -> EngineResult<BackupRecord> {
        let metadata =
            fs::metadata(path).map_err(|e| EngineError::io("backing up", path, e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                EngineError::io(
                    "backing up",
                    path,
                    io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;

        let dir = self.root.join(client.as_str());
        ensure_dir(&dir).map_err(|e| EngineError::io("creating backup directory", &dir, e))?;

        let mut created_at_ms = chrono::Utc::now().timestamp_millis();
        loop {
            let backup_path = dir.join(format!("{file_name}.{created_at_ms}.{BACKUP_EXTENSION}"));
            match claim(&backup_path, metadata.is_dir()) {
                Ok(()) => {
                    let copied = if metadata.is_dir() {
                        copy_dir_all(path, &backup_path)
                    } else {
                        copy_file(path, &backup_path)
                    };
                    if let Err(e) = copied {
                        let _ = remove_path(&backup_path);
                        return Err(EngineError::io(
                            format!("copying to backup {} from", backup_path.display()),
                            path,
                            e,
                        ));
                    }

                    info!("Backed up {} to {}", path.display(), backup_path.display());
                    return Ok(BackupRecord {
                        original_path: path.to_path_buf(),
                        backup_path,
                        created_at_ms,
                        is_dir: metadata.is_dir(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Backup name {} taken, bumping timestamp", backup_path.display());
                    created_at_ms += 1;
                }
                Err(e) => return Err(EngineError::io("creating backup", &backup_path, e)),
            }
        }
    }

    /// Put the backed-up content back at the original location.
    ///
    /// Idempotent: restoring the same record twice leaves the same state.
    /// The backup itself is kept.
    pub fn restore(&self, record: &BackupRecord) -> EngineResult<()> {
        warn!(
            "Restoring {} from backup {}",
            record.original_path.display(),
            record.backup_path.display()
        );

        if record.is_dir {
            remove_path(&record.original_path)
                .map_err(|e| EngineError::io("clearing before restore", &record.original_path, e))?;
            copy_dir_all(&record.backup_path, &record.original_path)
                .map_err(|e| EngineError::io("restoring", &record.original_path, e))?;
        } else {
            let content = fs::read(&record.backup_path)
                .map_err(|e| EngineError::io("reading backup", &record.backup_path, e))?;
            atomic_write(&record.original_path, &content)
                .map_err(|e| EngineError::io("restoring", &record.original_path, e))?;
        }
        Ok(())
    }
}

fn claim(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::create_dir(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path).map(drop)
    }
}

fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    fs::File::open(dst)?.sync_all()
}
