//! Filesystem helpers shared by the patcher, the deployer and the ledger store

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::error::{CodegenError, Result};

/// Replace the contents of `path` with `content`.
///
/// The content goes to a temporary file next to the target which is then
/// renamed over it, so readers see either the old or the new content in full.
/// A symbolic link is followed and its target rewritten. Permission bits of an
/// existing target are carried over; a new file gets the usual creation mode
/// (`0o666` less the umask on unix).
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let target = resolve_link(path)?;
    let path = target.as_path();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| CodegenError::file(parent, e))?;

    let previous = fs::metadata(path).ok();

    let mut temp = temp_file_in(parent).map_err(|e| CodegenError::file(parent, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| CodegenError::file(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| CodegenError::file(path, e))?;

    if let Some(meta) = previous {
        temp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| CodegenError::file(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| CodegenError::file(path, e.error))?;
    Ok(())
}

/// The file a symbolic link points at, or `path` itself
fn resolve_link(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| CodegenError::file(path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

#[cfg(unix)]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // open(2) applies the umask to the requested mode
    Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}

/// Remove a file or a directory tree. A path that is already gone counts as removed.
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(CodegenError::file(path, e)),
    };

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match removed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CodegenError::file(path, e)),
    }
}

/// Remove `dir` if it exists and is empty; anything else is left alone.
pub fn prune_empty_dir(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none() && fs::remove_dir(dir).is_ok(),
        Err(_) => false,
    }
}

/// Create a directory, treating "already exists" as success
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(CodegenError::file(path, e)),
    }
}
