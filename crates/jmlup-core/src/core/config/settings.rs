use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jmlup_domain::{
    CheckerOptions, JmlMode, ReleaseSpec, ToolchainLayout, DEFAULT_ROOT, DEFAULT_URL_TEMPLATE,
    DEFAULT_VERSION, RELEASE_JAVA_HOME_SUBDIR,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::file::{ConfigFile, CONFIG_FILENAME};
use crate::core::bootstrap::{BootstrapIssue, BootstrapPlan};
use crate::InstallUserError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    pub offline: bool,
    pub config: Option<String>,
    #[serde(default)]
    pub toolchain: ToolchainOverrides,
}

/// Command-line values that win over the config file and the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolchainOverrides {
    pub root: Option<PathBuf>,
    pub version: Option<String>,
    pub url_template: Option<String>,
    pub sha256: Option<String>,
    pub java_home_subdir: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) toolchain: ToolchainConfig,
    pub(crate) network: NetworkConfig,
    pub(crate) checker: CheckerOptions,
    pub(crate) source: Option<PathBuf>,
}

impl Config {
    /// Layers defaults, the config file, the environment, and `global` in that order.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be read or the config file is
    /// missing or invalid.
    pub fn load(global: &GlobalOptions) -> Result<Self> {
        let cwd = env::current_dir().context("failed to read the working directory")?;
        let snapshot = EnvSnapshot::capture();
        let explicit = global.config.as_deref().map(Path::new);
        let file = ConfigFile::discover(explicit, &cwd)?;
        Ok(Self::from_sources(global, &snapshot, file, &cwd))
    }

    pub(crate) fn from_sources(
        global: &GlobalOptions,
        snapshot: &EnvSnapshot,
        file: Option<(PathBuf, ConfigFile)>,
        cwd: &Path,
    ) -> Self {
        let (source, file) = match file {
            Some((path, file)) => (Some(path), file),
            None => (None, ConfigFile::default()),
        };
        let overrides = &global.toolchain;

        let root = overrides
            .root
            .clone()
            .or_else(|| snapshot.non_empty("JMLUP_ROOT").map(PathBuf::from))
            .or(file.root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        let url_template = overrides
            .url_template
            .clone()
            .or_else(|| snapshot.non_empty("JMLUP_URL_TEMPLATE"))
            .or(file.url_template)
            .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string());
        // Published release archives nest the JDK; custom archives are taken as flat.
        let release_subdir = (url_template == DEFAULT_URL_TEMPLATE)
            .then(|| RELEASE_JAVA_HOME_SUBDIR.to_string());
        let toolchain = ToolchainConfig {
            root: cwd.join(root),
            version: overrides
                .version
                .clone()
                .or_else(|| snapshot.non_empty("JMLUP_VERSION"))
                .or(file.version)
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            url_template,
            sha256: overrides
                .sha256
                .clone()
                .or_else(|| snapshot.non_empty("JMLUP_SHA256"))
                .or(file.sha256),
            home_dir: file.home,
            java_home_subdir: overrides
                .java_home_subdir
                .clone()
                .or_else(|| snapshot.non_empty("JMLUP_JAVA_HOME_SUBDIR"))
                .or(file.java_home_subdir)
                .or(release_subdir),
        };

        let online = if global.offline {
            false
        } else {
            match snapshot.var("JMLUP_ONLINE") {
                Some(value) => {
                    let lowered = value.trim().to_ascii_lowercase();
                    !matches!(lowered.as_str(), "0" | "false" | "no" | "off" | "")
                }
                None => true,
            }
        };

        let defaults = CheckerOptions::default();
        let mode = match snapshot.var("JML_MODE") {
            Some(value) => JmlMode::from_env_value(Some(value)),
            None => file.mode.unwrap_or_default(),
        };
        let checker = CheckerOptions {
            mode,
            timeout_secs: file.timeout.unwrap_or(defaults.timeout_secs),
            specs_path: file.specs_path.unwrap_or(defaults.specs_path),
        };

        Self {
            toolchain,
            network: NetworkConfig { online },
            checker,
            source,
        }
    }

    #[must_use]
    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }

    #[must_use]
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    #[must_use]
    pub fn checker(&self) -> &CheckerOptions {
        &self.checker
    }

    /// Config file the values were read from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Builds the bootstrap plan for the configured toolchain.
    ///
    /// # Errors
    /// Returns [`BootstrapIssue::InvalidRelease`] for an unusable version or url template, or a
    /// user error for an unusable directory name.
    pub fn plan(&self) -> Result<BootstrapPlan> {
        let toolchain = &self.toolchain;
        let release = ReleaseSpec::new(&toolchain.version, &toolchain.url_template)
            .map_err(BootstrapIssue::from)?;
        let mut layout = ToolchainLayout::new(&toolchain.root);
        if let Some(home) = &toolchain.home_dir {
            layout = layout.with_home_dir(relative_dir("home", home)?);
        }
        if let Some(subdir) = &toolchain.java_home_subdir {
            layout = layout.with_java_home_subdir(relative_dir("java_home_subdir", subdir)?);
        }
        Ok(BootstrapPlan::new(release, layout).with_expected_sha256(toolchain.sha256.clone()))
    }
}

fn relative_dir<'a>(key: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    let path = Path::new(trimmed);
    let escapes = path
        .components()
        .any(|component| !matches!(component, std::path::Component::Normal(_)));
    if trimmed.is_empty() || escapes {
        return Err(InstallUserError::new(
            format!("{key} must be a relative directory inside the toolchain root"),
            json!({
                "reason": "invalid_config",
                "key": key,
                "value": value,
                "hint": format!("Set {key} to a plain directory name such as `jdk` (see {CONFIG_FILENAME})."),
            }),
        )
        .into());
    }
    Ok(trimmed)
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolchainConfig {
    pub root: PathBuf,
    pub version: String,
    pub url_template: String,
    pub sha256: Option<String>,
    pub home_dir: Option<String>,
    pub java_home_subdir: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NetworkConfig {
    pub online: bool,
}
