use serde::{Deserialize, Serialize};

/// Suffix marking the untouched, pre-substitution binary.
pub const ORIGINAL_EXECUTABLE_SUFFIX: &str = ".orig";

/// Suffix used by the generic substitutor when the caller does not pick one.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// The two executables a toolchain bootstrap takes over.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Tool {
    #[serde(rename = "javac")]
    #[strum(serialize = "javac")]
    Compiler,
    #[serde(rename = "java")]
    #[strum(serialize = "java")]
    Runtime,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Compiler, Tool::Runtime];

    /// File name of the binary under `bin/`.
    #[must_use]
    pub const fn binary_name(self) -> &'static str {
        match self {
            Tool::Compiler => "javac",
            Tool::Runtime => "java",
        }
    }

    /// File name of the generated forwarding launcher under `bin/`.
    #[must_use]
    pub const fn launcher_name(self) -> &'static str {
        match self {
            Tool::Compiler => "jmlavac",
            Tool::Runtime => "jmlava",
        }
    }
}
