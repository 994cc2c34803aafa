//! Recursive copy of the staged template modules

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{CodegenError, Result};

/// Copy one file, replacing `dst` and giving it the permissions of `src` plus
/// owner write, so the next run can replace it again
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| CodegenError::file(src, e))?;
    fs::copy(src, dst).map_err(|e| CodegenError::file(dst, e))?;
    fs::set_permissions(dst, owner_writable(meta.permissions()))
        .map_err(|e| CodegenError::file(dst, e))?;
    trace!("Copied {} -> {}", src.display(), dst.display());
    Ok(())
}

/// Copy the tree under `src` into `dst`, creating `dst` when missing.
///
/// Existing destination files are overwritten. Symbolic links are skipped,
/// both for files and directories. Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    let meta = fs::metadata(src).map_err(|e| CodegenError::file(src, e))?;
    if !meta.is_dir() {
        return Err(CodegenError::file(
            src,
            io::Error::new(io::ErrorKind::InvalidInput, "source is not a directory"),
        ));
    }

    fs::create_dir_all(dst).map_err(|e| CodegenError::file(dst, e))?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| CodegenError::file(src, e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| CodegenError::file(src, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut copied = 0;
    for entry in entries {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let ty = entry.file_type().map_err(|e| CodegenError::file(&from, e))?;

        if ty.is_symlink() {
            debug!("Skipping symlink {}", from.display());
        } else if ty.is_dir() {
            copied += copy_dir(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
            copied += 1;
        }
    }

    // Directory mode last so a read-only source still gets its children
    fs::set_permissions(dst, owner_writable(meta.permissions()))
        .map_err(|e| CodegenError::file(dst, e))?;
    Ok(copied)
}

#[cfg(unix)]
fn owner_writable(permissions: fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    fs::Permissions::from_mode(permissions.mode() | 0o200)
}

#[cfg(not(unix))]
fn owner_writable(mut permissions: fs::Permissions) -> fs::Permissions {
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    permissions
}
