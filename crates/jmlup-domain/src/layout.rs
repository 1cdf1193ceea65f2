use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::executable::Tool;

pub const DEFAULT_ROOT: &str = ".openjml";
pub const ARCHIVE_FILENAME: &str = "openjml.zip";
pub const DEFAULT_HOME_DIR: &str = "jdk";
pub const LOCK_FILENAME: &str = ".jmlup.lock";
pub const RUNTIME_JAR: &str = "jmlruntime.jar";

/// On-disk locations of one bootstrapped toolchain.
///
/// The archive is unpacked into `home`; `java_home` is either `home` itself or a directory
/// nested inside it when the release archive wraps the JDK in a subdirectory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolchainLayout {
    root: PathBuf,
    archive: PathBuf,
    home: PathBuf,
    java_home: PathBuf,
}

impl ToolchainLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let home = root.join(DEFAULT_HOME_DIR);
        Self {
            archive: root.join(ARCHIVE_FILENAME),
            java_home: home.clone(),
            home,
            root,
        }
    }

    /// Unpack into `<root>/<name>` instead of `<root>/jdk`.
    #[must_use]
    pub fn with_home_dir(mut self, name: &str) -> Self {
        let relative = self
            .java_home
            .strip_prefix(&self.home)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.home = self.root.join(name);
        self.java_home = if relative.as_os_str().is_empty() {
            self.home.clone()
        } else {
            self.home.join(relative)
        };
        self
    }

    /// Treat `<home>/<subdir>` as the JDK root.
    #[must_use]
    pub fn with_java_home_subdir(mut self, subdir: &str) -> Self {
        self.java_home = self.home.join(subdir);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    #[must_use]
    pub fn java_home(&self) -> &Path {
        &self.java_home
    }

    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.java_home.join("bin")
    }

    #[must_use]
    pub fn executable(&self, tool: Tool) -> PathBuf {
        self.bin_dir().join(tool.binary_name())
    }

    #[must_use]
    pub fn launcher(&self, tool: Tool) -> PathBuf {
        self.bin_dir().join(tool.launcher_name())
    }

    #[must_use]
    pub fn backup(&self, tool: Tool, suffix: &str) -> PathBuf {
        backup_path(&self.executable(tool), suffix)
    }

    #[must_use]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILENAME)
    }

    #[must_use]
    pub fn runtime_jar(&self) -> PathBuf {
        self.home.join(RUNTIME_JAR)
    }
}

/// Sibling of `target` whose file name is the full original name followed by `suffix`.
///
/// `javac` becomes `javac.orig` and `tool.sh` becomes `tool.sh.orig`; the extension is kept.
#[must_use]
pub fn backup_path(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(suffix);
    target.with_file_name(name)
}
