//! Backup, write and rollback as one guarded sequence.
//!
//! A mutation moves through
//!
//! ```text
//! validated -> backed_up -> applied -> committed
//!                  \            \
//!                   `------------`--> rolled_back
//! ```
//!
//! `committed` and `rolled_back` are the only terminal states. Any failure
//! after `backed_up` restores the snapshot before the error is returned, and
//! a transaction dropped before [`MutationTransaction::commit`] restores it
//! as well.

use super::{BackupManager, BackupRecord};
use crate::core::{ClientKind, EngineError, EngineResult};
use crate::utils::fs::remove_path;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Position of a mutation in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStage {
    /// Request validated, nothing touched yet
    Validated,
    /// Snapshot taken
    BackedUp,
    /// New content written
    Applied,
    /// Terminal: change kept
    Committed,
    /// Terminal: snapshot restored
    RolledBack,
}

impl fmt::Display for MutationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validated => "validated",
            Self::BackedUp => "backed_up",
            Self::Applied => "applied",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// Failure points that tests can switch on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultInjection {
    /// Fail right after the backup, before writing
    pub fail_after_backup: bool,
    /// Fail right after the write, before committing
    pub fail_after_write: bool,
}

#[derive(Debug)]
enum Snapshot {
    /// Target did not exist; rollback deletes whatever was created
    Absent,
    /// Target existed and was copied
    Saved(BackupRecord),
}

/// A single mutation of one file or directory.
pub struct MutationTransaction<'a> {
    backups: &'a BackupManager,
    target: PathBuf,
    snapshot: Snapshot,
    /// Ancestors of an absent target that did not exist either, nearest first
    missing_dirs: Vec<PathBuf>,
    stage: MutationStage,
    faults: FaultInjection,
}

impl<'a> MutationTransaction<'a> {
    /// Snapshot `target` and enter `backed_up`.
    ///
    /// A target that does not exist yet is recorded as absent and no backup
    /// file is written. Its missing parent directories are remembered so a
    /// rollback can remove the ones the write created.
    pub fn begin(
        backups: &'a BackupManager,
        client: ClientKind,
        target: &Path,
        faults: FaultInjection,
    ) -> EngineResult<Self> {
        let snapshot = match std::fs::symlink_metadata(target) {
            Ok(_) => Snapshot::Saved(backups.backup(client, target)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Snapshot::Absent,
            Err(e) => return Err(EngineError::io("inspecting", target, e)),
        };
        let missing_dirs = match &snapshot {
            Snapshot::Absent => missing_ancestors(target),
            Snapshot::Saved(_) => Vec::new(),
        };
        debug!("{}: {} -> {}", target.display(), MutationStage::Validated, MutationStage::BackedUp);

        Ok(Self {
            backups,
            target: target.to_path_buf(),
            snapshot,
            missing_dirs,
            stage: MutationStage::BackedUp,
            faults,
        })
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> MutationStage {
        self.stage
    }

    /// Backup taken by [`MutationTransaction::begin`], if the target existed.
    #[must_use]
    pub fn backup(&self) -> Option<&BackupRecord> {
        match &self.snapshot {
            Snapshot::Saved(record) => Some(record),
            Snapshot::Absent => None,
        }
    }

    /// Run the write and enter `applied`.
    ///
    /// On failure the snapshot is restored and the returned error is an
    /// [`EngineError::RolledBack`] wrapping the cause.
    pub fn apply<F>(&mut self, write: F) -> EngineResult<()>
    where
        F: FnOnce(&Path) -> EngineResult<()>,
    {
        if self.faults.fail_after_backup {
            let cause = self.injected("after backup");
            return Err(self.rollback(cause));
        }

        if let Err(cause) = write(&self.target) {
            return Err(self.rollback(cause));
        }
        self.stage = MutationStage::Applied;
        debug!("{}: {} -> {}", self.target.display(), MutationStage::BackedUp, self.stage);

        if self.faults.fail_after_write {
            let cause = self.injected("after write");
            return Err(self.rollback(cause));
        }
        Ok(())
    }

    /// Check the written state; roll back if the check fails.
    pub fn verify<F>(&mut self, check: F) -> EngineResult<()>
    where
        F: FnOnce(&Path) -> EngineResult<()>,
    {
        match check(&self.target) {
            Ok(()) => Ok(()),
            Err(cause) => Err(self.rollback(cause)),
        }
    }

    /// Keep the change. Returns the backup left behind for manual recovery.
    pub fn commit(mut self) -> Option<BackupRecord> {
        self.stage = MutationStage::Committed;
        info!("Committed mutation of {}", self.target.display());
        match std::mem::replace(&mut self.snapshot, Snapshot::Absent) {
            Snapshot::Saved(record) => Some(record),
            Snapshot::Absent => None,
        }
    }

    fn injected(&self, point: &str) -> EngineError {
        EngineError::io(
            format!("mutating (injected failure {point})"),
            &self.target,
            io::Error::other("injected fault"),
        )
    }

    fn rollback(&mut self, cause: EngineError) -> EngineError {
        let failed_at = self.stage;
        warn!("Mutation of {} failed at {}: {}", self.target.display(), failed_at, cause);

        let restored = match self.restore_snapshot() {
            Ok(()) => true,
            Err(e) => {
                error!("Rollback of {} failed: {}", self.target.display(), e);
                false
            }
        };
        self.stage = MutationStage::RolledBack;

        EngineError::RolledBack {
            source: Box::new(cause),
            stage: failed_at,
            restored,
            backup_path: self.backup().map(|record| record.backup_path.clone()),
        }
    }

    fn restore_snapshot(&self) -> EngineResult<()> {
        match &self.snapshot {
            Snapshot::Saved(record) => self.backups.restore(record),
            Snapshot::Absent => {
                remove_path(&self.target)
                    .map_err(|e| EngineError::io("removing partially created", &self.target, e))?;
                self.remove_created_dirs();
                Ok(())
            }
        }
    }

    /// Remove parents created by the failed write, stopping at the first one
    /// that is still in use.
    fn remove_created_dirs(&self) {
        for dir in &self.missing_dirs {
            match std::fs::remove_dir(dir) {
                Ok(()) => debug!("Removed created directory {}", dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    debug!("Keeping {}: {}", dir.display(), e);
                    break;
                }
            }
        }
    }
}

fn missing_ancestors(target: &Path) -> Vec<PathBuf> {
    target
        .ancestors()
        .skip(1)
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .map(Path::to_path_buf)
        .collect()
}

impl Drop for MutationTransaction<'_> {
    fn drop(&mut self) {
        if matches!(self.stage, MutationStage::BackedUp | MutationStage::Applied) {
            warn!("Mutation of {} dropped before commit; rolling back", self.target.display());
            if let Err(e) = self.restore_snapshot() {
                error!("Rollback of {} failed: {}", self.target.display(), e);
            }
            self.stage = MutationStage::RolledBack;
        }
    }
}
