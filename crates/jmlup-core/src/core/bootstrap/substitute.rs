use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::Result;
use jmlup_domain::backup_path;
use tracing::{debug, info};

use super::errors::{fs_issue, BootstrapIssue};
use super::StageOutcome;
use crate::core::fs::{path_exists, persist_file, set_owner_executable, stage_file};

/// Puts `replacement` at `target`, keeping the original at `target` + `suffix`.
///
/// A present backup means the substitution already happened, whatever `target` currently is.
/// The replacement copy is staged next to `target` with its executable bit set before the
/// original is moved aside, so the only step between the two renames is the second rename.
///
/// # Errors
/// Returns [`BootstrapIssue::MissingExecutable`] when neither `target` nor its backup exists,
/// or a filesystem issue if copying or renaming fails.
pub fn substitute_executable(
    target: &Path,
    replacement: &Path,
    suffix: &str,
) -> Result<StageOutcome> {
    let backup = backup_path(target, suffix);
    if path_exists(&backup) {
        info!(
            executable = %target.display(),
            "executable has already been replaced; no need to copy"
        );
        return Ok(StageOutcome::Skipped);
    }
    if !path_exists(target) {
        return Err(BootstrapIssue::MissingExecutable {
            path: target.to_path_buf(),
        }
        .into());
    }

    debug!(
        executable = %target.display(),
        replacement = %replacement.display(),
        "replacing executable"
    );
    let mut source = File::open(replacement).map_err(fs_issue("open", replacement))?;
    let mut staged = stage_file(target)?;
    io::copy(&mut source, staged.as_file_mut()).map_err(fs_issue("copy", replacement))?;
    let permissions = source
        .metadata()
        .map_err(fs_issue("read metadata of", replacement))?
        .permissions();
    fs::set_permissions(staged.path(), permissions)
        .map_err(fs_issue("set permissions on", staged.path()))?;
    set_owner_executable(staged.path()).map_err(fs_issue("set permissions on", staged.path()))?;

    fs::rename(target, &backup).map_err(fs_issue("rename", target))?;
    persist_file(staged, target)?;
    info!(
        executable = %target.display(),
        backup = %backup.display(),
        "executable replaced"
    );
    Ok(StageOutcome::Performed)
}

/// Moves the backup made by [`substitute_executable`] back over `target`.
///
/// # Errors
/// Returns a filesystem issue if the rename fails.
pub fn restore_executable(target: &Path, suffix: &str) -> Result<StageOutcome> {
    let backup = backup_path(target, suffix);
    if !path_exists(&backup) {
        debug!(executable = %target.display(), "no backup; nothing to restore");
        return Ok(StageOutcome::Skipped);
    }
    fs::rename(&backup, target).map_err(fs_issue("restore", &backup))?;
    info!(executable = %target.display(), "original executable restored");
    Ok(StageOutcome::Performed)
}
