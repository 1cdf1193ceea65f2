use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use jmlup_domain::JmlMode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::InstallUserError;

pub(crate) const CONFIG_FILENAME: &str = "jmlup.toml";

/// `jmlup.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub(crate) version: Option<String>,
    pub(crate) root: Option<PathBuf>,
    pub(crate) url_template: Option<String>,
    pub(crate) sha256: Option<String>,
    pub(crate) home: Option<String>,
    pub(crate) java_home_subdir: Option<String>,
    pub(crate) mode: Option<JmlMode>,
    pub(crate) timeout: Option<u32>,
    pub(crate) specs_path: Option<String>,
}

impl ConfigFile {
    /// Loads `explicit`, or `jmlup.toml` in `cwd` when present.
    pub(crate) fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Option<(PathBuf, Self)>> {
        if let Some(path) = explicit {
            let path = cwd.join(path);
            if !path.is_file() {
                return Err(InstallUserError::new(
                    format!("config file {} not found", path.display()),
                    json!({
                        "reason": "missing_config",
                        "path": path.display().to_string(),
                        "hint": "Check the --config path.",
                    }),
                )
                .into());
            }
            let file = Self::load(&path)?;
            return Ok(Some((path, file)));
        }
        let path = cwd.join(CONFIG_FILENAME);
        if path.is_file() {
            let file = Self::load(&path)?;
            Ok(Some((path, file)))
        } else {
            Ok(None)
        }
    }

    /// Parses `path`; a relative `root` is taken relative to the file's directory.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        debug!(config = %path.display(), "reading config file");
        let contents = fs::read_to_string(path).map_err(|err| {
            InstallUserError::new(
                format!("failed to read {}", path.display()),
                json!({
                    "reason": "invalid_config",
                    "path": path.display().to_string(),
                    "error": err.to_string(),
                }),
            )
        })?;
        let mut file: Self = toml_edit::de::from_str(&contents).map_err(|err| {
            InstallUserError::new(
                format!("{} is not a valid jmlup config", path.display()),
                json!({
                    "reason": "invalid_config",
                    "path": path.display().to_string(),
                    "error": err.to_string(),
                    "hint": "Fix the TOML syntax or remove unknown keys, then re-run the command.",
                }),
            )
        })?;
        if let (Some(root), Some(dir)) = (file.root.as_ref(), path.parent()) {
            if root.is_relative() {
                file.root = Some(dir.join(root));
            }
        }
        Ok(file)
    }
}
