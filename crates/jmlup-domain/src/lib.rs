//! Types shared by the jmlup core and CLI: where a toolchain lives on disk, which release to
//! fetch, and how the checker is configured.

pub mod executable;
pub mod layout;
pub mod mode;
pub mod release;

pub use executable::{Tool, DEFAULT_BACKUP_SUFFIX, ORIGINAL_EXECUTABLE_SUFFIX};
pub use layout::{
    backup_path, ToolchainLayout, ARCHIVE_FILENAME, DEFAULT_HOME_DIR, DEFAULT_ROOT,
    LOCK_FILENAME, RUNTIME_JAR,
};
pub use mode::{CheckerOptions, JmlMode, DEFAULT_SPECS_PATH, DEFAULT_TIMEOUT_SECS};
pub use release::{
    ReleaseError, ReleaseSpec, DEFAULT_URL_TEMPLATE, DEFAULT_VERSION, RELEASE_JAVA_HOME_SUBDIR,
    VERSION_PLACEHOLDER,
};
