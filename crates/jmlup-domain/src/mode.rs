use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u32 = 30;
pub const DEFAULT_SPECS_PATH: &str = "specs/";
const RAC_EXCEPTION_PROPERTY: &str = "-Dorg.jmlspecs.openjml.rac=exception";

/// Which checker the compiler runs.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JmlMode {
    /// Runtime assertion checking.
    #[default]
    Rac,
    /// Extended static checking.
    Esc,
}

impl JmlMode {
    /// Interprets a `JML_MODE` value; only the exact string `esc` selects static checking.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("esc") => JmlMode::Esc,
            _ => JmlMode::Rac,
        }
    }

    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            JmlMode::Rac => "-rac",
            JmlMode::Esc => "-esc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckerOptions {
    pub mode: JmlMode,
    pub timeout_secs: u32,
    pub specs_path: String,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            mode: JmlMode::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            specs_path: DEFAULT_SPECS_PATH.to_string(),
        }
    }
}

impl CheckerOptions {
    /// Arguments a build passes to the substituted `javac`.
    #[must_use]
    pub fn compiler_args(&self) -> Vec<String> {
        vec![
            "-jml".to_string(),
            self.mode.flag().to_string(),
            "-timeout".to_string(),
            self.timeout_secs.to_string(),
            "--nullable-by-default".to_string(),
            "--specs-path".to_string(),
            self.specs_path.clone(),
        ]
    }

    /// JVM arguments for running code compiled with assertion checks.
    #[must_use]
    pub fn runtime_jvm_args(&self) -> Vec<String> {
        vec![RAC_EXCEPTION_PROPERTY.to_string()]
    }
}
