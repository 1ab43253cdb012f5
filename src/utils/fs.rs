//! File system helpers with crash-safe writes.
//!
//! These return [`std::io::Result`] so callers can classify failures
//! (permission vs. other I/O) before wrapping them in an engine error.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Create `path` and its parents if missing. Fails if it exists as a file.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("path exists but is not a directory: {}", path.display()),
        ));
    }
    fs::create_dir_all(path)
}

/// Write `content` to `path` atomically.
///
/// The bytes go to a temporary file in the same directory, are synced to
/// disk, and the temporary file is renamed over the target. A reader sees
/// either the old document or the new one, never a partial write. Parent
/// directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the original file's permissions on the replacement.
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Recursively copy a directory tree. Symlinks are skipped.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    ensure_dir(dst)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Remove a file or directory tree. Missing paths are not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
