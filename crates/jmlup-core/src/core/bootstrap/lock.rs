use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Result;
use fs4::FileExt;
use tracing::{debug, info};

use super::errors::fs_issue;
use crate::core::fs::create_parent_dirs;

/// Exclusive advisory lock over a toolchain root, released on drop.
#[derive(Debug)]
pub(crate) struct BootstrapLock {
    _file: File,
}

impl BootstrapLock {
    /// Takes the lock at `path`, waiting for another holder to finish if necessary.
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        create_parent_dirs(path)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(fs_issue("open lock file", path))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(err) if is_contended(&err) => {
                info!(lock = %path.display(), "another jmlup run holds the toolchain lock; waiting");
                file.lock_exclusive().map_err(fs_issue("lock", path))?;
            }
            Err(err) => return Err(fs_issue("lock", path)(err).into()),
        }
        debug!(lock = %path.display(), "toolchain lock acquired");
        Ok(Self { _file: file })
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    if err.kind() == ErrorKind::WouldBlock {
        return true;
    }
    #[cfg(windows)]
    if matches!(err.raw_os_error(), Some(32 | 33)) {
        return true;
    }
    false
}
