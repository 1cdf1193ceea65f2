use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

use super::errors::{fs_issue, BootstrapIssue};
use super::StageOutcome;
use crate::core::fs::{path_exists, promote_dir, stage_dir};

/// Unpacks `archive` into `dest` unless `dest` already exists.
///
/// Entries keep their relative paths and unix permission bits. Everything is unpacked into a
/// staging sibling first, so a failure never leaves a partial `dest` behind.
///
/// # Errors
/// Returns an error if the archive cannot be read or is malformed, or if the tree cannot be
/// written and moved into place.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<StageOutcome> {
    if path_exists(dest) {
        info!(home = %dest.display(), "toolchain home already present; no need to extract");
        return Ok(StageOutcome::Skipped);
    }

    let file = File::open(archive).map_err(fs_issue("open", archive))?;
    let mut zip = ZipArchive::new(file).map_err(|err| archive_issue(archive, err))?;
    debug!(
        archive = %archive.display(),
        entries = zip.len(),
        "unpacking release archive"
    );
    let staged = stage_dir(dest)?;
    unpack_entries(&mut zip, archive, staged.path())?;
    promote_dir(staged, dest)?;
    info!(home = %dest.display(), "release archive unpacked");
    Ok(StageOutcome::Performed)
}

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Writes every entry below `dest`; symlink entries become symlinks again.
fn unpack_entries(
    zip: &mut ZipArchive<File>,
    archive: &Path,
    dest: &Path,
) -> Result<(), BootstrapIssue> {
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|err| archive_issue(archive, err))?;
        let Some(out) = entry.enclosed_name().map(|name| dest.join(name)) else {
            warn!(entry = entry.name(), "skipping archive entry outside the toolchain home");
            continue;
        };
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(fs_issue("create directory", &out))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(fs_issue("create directory", parent))?;
        }
        if is_symlink(&entry) {
            let mut target = String::new();
            entry
                .read_to_string(&mut target)
                .map_err(|err| archive_issue(archive, ZipError::Io(err)))?;
            write_symlink(&target, &out).map_err(fs_issue("link", &out))?;
            continue;
        }
        let mut file = File::create(&out).map_err(fs_issue("create", &out))?;
        io::copy(&mut entry, &mut file).map_err(|err| archive_issue(archive, ZipError::Io(err)))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out, fs::Permissions::from_mode(mode & 0o7777))
                    .map_err(fs_issue("set permissions on", &out))?;
            }
        }
    }
    Ok(())
}

fn is_symlink(entry: &ZipFile<'_>) -> bool {
    entry
        .unix_mode()
        .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
}

#[cfg(unix)]
fn write_symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn write_symlink(target: &str, link: &Path) -> io::Result<()> {
    fs::write(link, target)
}

fn archive_issue(archive: &Path, err: ZipError) -> BootstrapIssue {
    match err {
        ZipError::Io(source) => fs_issue("unpack", archive)(source),
        other => BootstrapIssue::Archive {
            path: archive.to_path_buf(),
            error: other.to_string(),
        },
    }
}
