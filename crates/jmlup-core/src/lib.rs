#![deny(clippy::all)]

mod core;

pub use crate::core::bootstrap::{
    bootstrap, expand_arguments, extract_archive, fetch_release, find_issue, forwarded_arguments,
    generate_launcher, inspect, restore_executable, restore_toolchain, substitute_executable,
    BootstrapIssue, BootstrapPlan, BootstrapReport, ForwardingBody, LauncherScript,
    ReleaseTransport, StageKind, StageOutcome, StageReport, SubstitutionState, SystemTransport,
    ToolStatus, ToolchainStatus, ARGUMENT_PRELUDE,
};
pub use crate::core::config::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::core::config::{Config, GlobalOptions, NetworkConfig, ToolchainConfig, ToolchainOverrides};
pub use crate::core::toolchain::{
    checker_args, toolchain_exec, toolchain_init, toolchain_restore, toolchain_status,
    ArgsRequest, ExecRequest,
};
pub use crate::core::tooling::diagnostics::commands as diag_commands;
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome, InstallUserError};
pub use crate::core::tooling::{error_outcome, format_status_message, to_json_response};
