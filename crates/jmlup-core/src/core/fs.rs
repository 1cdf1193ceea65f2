use std::fs::{self, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

use crate::core::bootstrap::errors::{fs_issue, BootstrapIssue};

/// Prefix of every temporary sibling created while staging a file or directory.
pub(crate) const STAGE_PREFIX: &str = ".jmlup-stage-";
const STALE_STAGE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Existence check that does not follow symlinks, so a dangling link still counts.
pub(crate) fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

pub(crate) fn create_parent_dirs(path: &Path) -> Result<&Path, BootstrapIssue> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(fs_issue("create directory", parent))?;
    Ok(parent)
}

/// Adds the owner-executable bit, leaving the other permission bits alone.
pub(crate) fn set_owner_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o100);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(unix)]
pub(crate) fn is_owner_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o100 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub(crate) fn is_owner_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(unix)]
fn readable_mode(is_dir: bool) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    Permissions::from_mode(if is_dir { 0o755 } else { 0o644 })
}

/// Temporary file next to `dest`; renaming it over `dest` is atomic on the same filesystem.
pub(crate) fn stage_file(dest: &Path) -> Result<NamedTempFile, BootstrapIssue> {
    let parent = create_parent_dirs(dest)?;
    let staged = tempfile::Builder::new()
        .prefix(STAGE_PREFIX)
        .tempfile_in(parent)
        .map_err(fs_issue("create temporary file in", parent))?;
    #[cfg(unix)]
    fs::set_permissions(staged.path(), readable_mode(false))
        .map_err(fs_issue("set permissions on", staged.path()))?;
    Ok(staged)
}

/// Temporary directory next to `dest`, promoted with [`promote_dir`].
pub(crate) fn stage_dir(dest: &Path) -> Result<TempDir, BootstrapIssue> {
    let parent = create_parent_dirs(dest)?;
    tempfile::Builder::new()
        .prefix(STAGE_PREFIX)
        .tempdir_in(parent)
        .map_err(fs_issue("create temporary directory in", parent))
}

pub(crate) fn persist_file(staged: NamedTempFile, dest: &Path) -> Result<(), BootstrapIssue> {
    staged
        .as_file()
        .sync_all()
        .map_err(fs_issue("flush", staged.path()))?;
    staged
        .persist(dest)
        .map(|_| ())
        .map_err(|err| fs_issue("move into place", dest)(err.error))
}

pub(crate) fn promote_dir(staged: TempDir, dest: &Path) -> Result<(), BootstrapIssue> {
    let staged_path = staged.keep();
    #[cfg(unix)]
    fs::set_permissions(&staged_path, readable_mode(true))
        .map_err(fs_issue("set permissions on", &staged_path))?;
    if let Err(err) = fs::rename(&staged_path, dest) {
        let _ = remove_dir_all_writable(&staged_path);
        return Err(fs_issue("move into place", dest)(err));
    }
    Ok(())
}

/// Best-effort recursive chmod for trees unpacked with read-only entries.
#[cfg(unix)]
fn make_writable_recursive(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    if meta.file_type().is_symlink() {
        return;
    }
    let mode = meta.permissions().mode() | if meta.is_dir() { 0o700 } else { 0o600 };
    let _ = fs::set_permissions(path, Permissions::from_mode(mode));
    if meta.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                make_writable_recursive(&entry.path());
            }
        }
    }
}

#[cfg(not(unix))]
fn make_writable_recursive(path: &Path) {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };
    let mut perms = meta.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        let _ = fs::set_permissions(path, perms);
    }
    if meta.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                make_writable_recursive(&entry.path());
            }
        }
    }
}

pub(crate) fn remove_dir_all_writable(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if !meta.is_dir() {
        return fs::remove_file(path);
    }
    make_writable_recursive(path);
    fs::remove_dir_all(path)
}

/// Removes staging leftovers of killed runs under `root`.
pub(crate) fn prune_stale_stages(root: &Path) -> Vec<PathBuf> {
    prune_stale_stages_older_than(root, STALE_STAGE_AGE)
}

fn prune_stale_stages_older_than(root: &Path, max_age: Duration) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    let Ok(entries) = fs::read_dir(root) else {
        return removed;
    };
    let now = SystemTime::now();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(STAGE_PREFIX) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let Some(modified) = meta.modified().ok() else {
            continue;
        };
        if now.duration_since(modified).unwrap_or_default() < max_age {
            continue;
        }
        let path = entry.path();
        if remove_dir_all_writable(&path).is_ok() {
            debug!(path = %path.display(), "removed stale staging entry");
            removed.push(path);
        }
    }
    removed
}
