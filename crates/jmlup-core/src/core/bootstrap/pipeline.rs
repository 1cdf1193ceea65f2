use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jmlup_domain::{ReleaseSpec, Tool, ToolchainLayout, ORIGINAL_EXECUTABLE_SUFFIX};
use serde::Serialize;
use tracing::{debug, info};

use super::extract::extract_archive;
use super::fetch::fetch_release;
use super::launcher::{generate_launcher, ForwardingBody, LauncherScript, ARGUMENT_PRELUDE};
use super::lock::BootstrapLock;
use super::substitute::{restore_executable, substitute_executable};
use super::transport::ReleaseTransport;
use super::{StageKind, StageOutcome, StageReport};
use crate::core::fs::{is_owner_executable, path_exists, prune_stale_stages};

/// Everything one bootstrap run needs to know, passed explicitly to every stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BootstrapPlan {
    release: ReleaseSpec,
    layout: ToolchainLayout,
    backup_suffix: String,
    #[serde(skip)]
    launcher_prelude: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_sha256: Option<String>,
}

impl BootstrapPlan {
    #[must_use]
    pub fn new(release: ReleaseSpec, layout: ToolchainLayout) -> Self {
        Self {
            release,
            layout,
            backup_suffix: ORIGINAL_EXECUTABLE_SUFFIX.to_string(),
            launcher_prelude: ARGUMENT_PRELUDE.to_string(),
            expected_sha256: None,
        }
    }

    #[must_use]
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_launcher_prelude(mut self, prelude: impl Into<String>) -> Self {
        self.launcher_prelude = prelude.into();
        self
    }

    #[must_use]
    pub fn with_expected_sha256(mut self, digest: Option<String>) -> Self {
        self.expected_sha256 = digest;
        self
    }

    #[must_use]
    pub fn release(&self) -> &ReleaseSpec {
        &self.release
    }

    #[must_use]
    pub fn layout(&self) -> &ToolchainLayout {
        &self.layout
    }

    #[must_use]
    pub fn backup_suffix(&self) -> &str {
        &self.backup_suffix
    }

    #[must_use]
    pub fn launcher_prelude(&self) -> &str {
        &self.launcher_prelude
    }

    #[must_use]
    pub fn expected_sha256(&self) -> Option<&str> {
        self.expected_sha256.as_deref()
    }

    /// Where the original `tool` binary lives once substituted.
    #[must_use]
    pub fn original(&self, tool: Tool) -> PathBuf {
        self.layout.backup(tool, &self.backup_suffix)
    }

    fn launcher_script(&self, tool: Tool) -> Result<LauncherScript> {
        Ok(LauncherScript::with_prelude(
            self.launcher_prelude.as_str(),
            ForwardingBody::exec(&self.original(tool))?,
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub version: String,
    pub root: PathBuf,
    pub java_home: PathBuf,
    pub stages: Vec<StageReport>,
}

impl BootstrapReport {
    fn new(plan: &BootstrapPlan) -> Self {
        Self {
            version: plan.release.version().to_string(),
            root: plan.layout.root().to_path_buf(),
            java_home: plan.layout.java_home().to_path_buf(),
            stages: Vec::new(),
        }
    }

    fn record(&mut self, stage: StageKind, tool: Option<Tool>, path: &Path, outcome: StageOutcome) {
        let report = StageReport::new(stage, tool, path, outcome);
        debug!(stage = %report.label(), path = %path.display(), ?outcome, "stage finished");
        self.stages.push(report);
    }

    #[must_use]
    pub fn performed(&self) -> usize {
        self.stages
            .iter()
            .filter(|stage| stage.outcome.performed())
            .count()
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.performed() == 0
    }
}

/// Runs fetch, extract, then launcher and substitution for `javac` and `java`, in that order.
///
/// The run holds the toolchain lock throughout; a concurrent run waits and then finds every
/// marker in place.
///
/// # Errors
/// Returns the first stage failure. Stages already completed are not rolled back.
pub fn bootstrap(plan: &BootstrapPlan, transport: &dyn ReleaseTransport) -> Result<BootstrapReport> {
    let layout = plan.layout();
    let _lock = BootstrapLock::acquire(&layout.lock_file())?;
    prune_leftovers(layout);

    let mut report = BootstrapReport::new(plan);
    let version = plan.release().version();

    let outcome = fetch_release(
        transport,
        plan.release(),
        layout.archive(),
        plan.expected_sha256(),
    )
    .with_context(|| format!("failed to fetch OpenJML {version}"))?;
    report.record(StageKind::Fetch, None, layout.archive(), outcome);

    let outcome = extract_archive(layout.archive(), layout.home())
        .with_context(|| format!("failed to unpack OpenJML {version}"))?;
    report.record(StageKind::Extract, None, layout.home(), outcome);

    for tool in Tool::ALL {
        let launcher = layout.launcher(tool);
        let script = plan.launcher_script(tool)?;
        let outcome = generate_launcher(&launcher, &script)
            .with_context(|| format!("failed to generate {}", tool.launcher_name()))?;
        report.record(StageKind::Launcher, Some(tool), &launcher, outcome);

        let executable = layout.executable(tool);
        let outcome = substitute_executable(&executable, &launcher, plan.backup_suffix())
            .with_context(|| format!("failed to substitute {tool}"))?;
        report.record(StageKind::Substitute, Some(tool), &executable, outcome);
    }

    if report.is_noop() {
        info!(version, "toolchain already bootstrapped");
    } else {
        info!(version, java_home = %layout.java_home().display(), "toolchain ready");
    }
    Ok(report)
}

/// Puts the original binaries back under their own names.
///
/// # Errors
/// Returns an error if the lock cannot be taken or a rename fails.
pub fn restore_toolchain(plan: &BootstrapPlan) -> Result<Vec<StageReport>> {
    let layout = plan.layout();
    let _lock = BootstrapLock::acquire(&layout.lock_file())?;
    let mut stages = Vec::new();
    for tool in Tool::ALL {
        let executable = layout.executable(tool);
        let outcome = restore_executable(&executable, plan.backup_suffix())
            .with_context(|| format!("failed to restore {tool}"))?;
        stages.push(StageReport::new(
            StageKind::Restore,
            Some(tool),
            &executable,
            outcome,
        ));
    }
    Ok(stages)
}

fn prune_leftovers(layout: &ToolchainLayout) {
    for dir in [layout.root().to_path_buf(), layout.bin_dir()] {
        for path in prune_stale_stages(&dir) {
            debug!(path = %path.display(), "pruned stale staging entry");
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionState {
    /// Original still in place, no backup yet.
    Pending,
    /// Backup present and something sits at the original name.
    Applied,
    /// Backup present but nothing at the original name.
    Broken,
    /// Neither the executable nor a backup exists.
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub tool: Tool,
    pub executable: PathBuf,
    pub launcher_present: bool,
    pub original_executable: bool,
    pub substitution: SubstitutionState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolchainStatus {
    pub version: String,
    pub root: PathBuf,
    pub archive: PathBuf,
    pub archive_present: bool,
    pub home: PathBuf,
    pub home_present: bool,
    pub java_home: PathBuf,
    pub runtime_jar_present: bool,
    pub tools: Vec<ToolStatus>,
}

impl ToolchainStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.archive_present
            && self.home_present
            && self.tools.iter().all(|tool| {
                tool.launcher_present && tool.substitution == SubstitutionState::Applied
            })
    }

    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.tools
            .iter()
            .any(|tool| tool.substitution == SubstitutionState::Broken)
    }
}

/// Reads every stage marker without changing anything.
#[must_use]
pub fn inspect(plan: &BootstrapPlan) -> ToolchainStatus {
    let layout = plan.layout();
    let tools = Tool::ALL
        .into_iter()
        .map(|tool| {
            let executable = layout.executable(tool);
            let original = plan.original(tool);
            let substitution = match (path_exists(&original), path_exists(&executable)) {
                (true, true) => SubstitutionState::Applied,
                (true, false) => SubstitutionState::Broken,
                (false, true) => SubstitutionState::Pending,
                (false, false) => SubstitutionState::Missing,
            };
            ToolStatus {
                tool,
                launcher_present: path_exists(&layout.launcher(tool)),
                original_executable: is_owner_executable(&original),
                executable,
                substitution,
            }
        })
        .collect();
    ToolchainStatus {
        version: plan.release().version().to_string(),
        root: layout.root().to_path_buf(),
        archive: layout.archive().to_path_buf(),
        archive_present: path_exists(layout.archive()),
        home: layout.home().to_path_buf(),
        home_present: path_exists(layout.home()),
        java_home: layout.java_home().to_path_buf(),
        runtime_jar_present: path_exists(&layout.runtime_jar()),
        tools,
    }
}
