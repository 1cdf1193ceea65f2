use std::io;
use std::path::{Path, PathBuf};

use jmlup_domain::ReleaseError;
use serde_json::{json, Value};

use crate::{CommandStatus, ExecutionOutcome};

/// Everything that can stop a bootstrap stage.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapIssue {
    #[error("failed to download {url}: {error}")]
    Transport { url: String, error: String },
    #[error("failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("release archive {} could not be unpacked: {error}", path.display())]
    Archive { path: PathBuf, error: String },
    #[error("checksum mismatch for {url} (expected {expected}, got {actual})")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },
    #[error("downloading {url} requires network access (offline mode)")]
    Offline { url: String },
    #[error(transparent)]
    InvalidRelease(#[from] ReleaseError),
    #[error("executable not found at {}", path.display())]
    MissingExecutable { path: PathBuf },
}

pub(crate) fn fs_issue(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> BootstrapIssue {
    let path = path.to_path_buf();
    move |source| BootstrapIssue::Filesystem {
        action,
        path,
        source,
    }
}

pub(crate) fn transport_issue(url: &str) -> impl FnOnce(String) -> BootstrapIssue + '_ {
    move |error| BootstrapIssue::Transport {
        url: url.to_string(),
        error,
    }
}

impl BootstrapIssue {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "JB201",
            Self::Filesystem { .. } => "JB202",
            Self::Archive { .. } => "JB203",
            Self::ChecksumMismatch { .. } => "JB204",
            Self::Offline { .. } => "JB205",
            Self::InvalidRelease(_) => "JB206",
            Self::MissingExecutable { .. } => "JB207",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "download_failed",
            Self::Filesystem { .. } => "filesystem_error",
            Self::Archive { .. } => "invalid_archive",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::Offline { .. } => "offline",
            Self::InvalidRelease(_) => "invalid_release",
            Self::MissingExecutable { .. } => "missing_executable",
        }
    }

    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Transport { .. } => {
                Some("Check the release version and network access, then re-run `jmlup init`.")
            }
            Self::Filesystem { .. } => None,
            Self::Archive { .. } => Some(
                "Delete the release archive so the next `jmlup init` downloads it again.",
            ),
            Self::ChecksumMismatch { .. } => {
                Some("Verify the configured sha256 matches the release you asked for.")
            }
            Self::Offline { .. } => Some(
                "Re-run without --offline / unset JMLUP_ONLINE=0, or point the url template at a local archive.",
            ),
            Self::InvalidRelease(ReleaseError::MissingPlaceholder { .. }) => {
                Some("Use {version} in the url template where the release version belongs.")
            }
            Self::InvalidRelease(_) => Some("Pass a release tag such as 0.17.0-alpha-15."),
            Self::MissingExecutable { .. } => Some(
                "Check that the archive ships bin/javac and bin/java, or set java_home_subdir if the JDK is nested.",
            ),
        }
    }

    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ChecksumMismatch { .. }
                | Self::Offline { .. }
                | Self::InvalidRelease(_)
                | Self::MissingExecutable { .. }
        )
    }

    #[must_use]
    pub fn details(&self) -> Value {
        let mut details = json!({
            "code": self.code(),
            "reason": self.reason(),
        });
        if let Value::Object(map) = &mut details {
            if let Some(hint) = self.hint() {
                map.insert("hint".into(), json!(hint));
            }
            match self {
                Self::Transport { url, error } => {
                    map.insert("url".into(), json!(url));
                    map.insert("error".into(), json!(error));
                }
                Self::Filesystem {
                    action,
                    path,
                    source,
                } => {
                    map.insert("action".into(), json!(action));
                    map.insert("path".into(), json!(path.display().to_string()));
                    map.insert("error".into(), json!(source.to_string()));
                }
                Self::Archive { path, error } => {
                    map.insert("path".into(), json!(path.display().to_string()));
                    map.insert("error".into(), json!(error));
                }
                Self::ChecksumMismatch {
                    url,
                    expected,
                    actual,
                } => {
                    map.insert("url".into(), json!(url));
                    map.insert("expected".into(), json!(expected));
                    map.insert("actual".into(), json!(actual));
                }
                Self::Offline { url } => {
                    map.insert("url".into(), json!(url));
                }
                Self::InvalidRelease(error) => {
                    map.insert("error".into(), json!(error.to_string()));
                }
                Self::MissingExecutable { path } => {
                    map.insert("path".into(), json!(path.display().to_string()));
                }
            }
        }
        details
    }

    #[must_use]
    pub fn to_outcome(&self) -> ExecutionOutcome {
        let status = if self.is_user_error() {
            CommandStatus::UserError
        } else {
            CommandStatus::Failure
        };
        ExecutionOutcome {
            status,
            message: self.to_string(),
            details: self.details(),
        }
    }
}

/// Finds the first [`BootstrapIssue`] anywhere in an error chain.
#[must_use]
pub fn find_issue(err: &anyhow::Error) -> Option<&BootstrapIssue> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BootstrapIssue>())
}
