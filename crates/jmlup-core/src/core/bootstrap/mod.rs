//! Bootstrap stages for an OpenJML toolchain.
//!
//! Each stage checks a filesystem predicate before doing anything, so running the pipeline
//! again picks up at the first stage whose marker is missing.

use std::path::{Path, PathBuf};

use jmlup_domain::Tool;
use serde::Serialize;

pub(crate) mod errors;
mod extract;
mod fetch;
mod launcher;
mod lock;
mod pipeline;
mod substitute;
mod transport;

pub use errors::{find_issue, BootstrapIssue};
pub use extract::extract_archive;
pub use fetch::fetch_release;
pub use launcher::{
    expand_arguments, forwarded_arguments, generate_launcher, ForwardingBody, LauncherScript,
    ARGUMENT_PRELUDE,
};
pub use pipeline::{
    bootstrap, inspect, restore_toolchain, BootstrapPlan, BootstrapReport, SubstitutionState,
    ToolStatus, ToolchainStatus,
};
pub use substitute::{restore_executable, substitute_executable};
pub use transport::{ReleaseTransport, SystemTransport};

/// Whether a stage did work or found its marker already in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
    Performed,
    Skipped,
}

impl StageOutcome {
    #[must_use]
    pub fn performed(self) -> bool {
        matches!(self, Self::Performed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageKind {
    Fetch,
    Extract,
    Launcher,
    Substitute,
    Restore,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: StageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<Tool>,
    pub path: PathBuf,
    pub outcome: StageOutcome,
}

impl StageReport {
    pub(crate) fn new(
        stage: StageKind,
        tool: Option<Tool>,
        path: &Path,
        outcome: StageOutcome,
    ) -> Self {
        Self {
            stage,
            tool,
            path: path.to_path_buf(),
            outcome,
        }
    }

    /// Short label such as `launcher (javac)`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.tool {
            Some(tool) => format!("{} ({tool})", self.stage),
            None => self.stage.to_string(),
        }
    }
}
