use std::env;

use anyhow::{Context, Result};
use jmlup_domain::{JmlMode, Tool};
use serde_json::json;
use tracing::info;

use super::process::run_command_passthrough;
use crate::core::bootstrap::{
    bootstrap, expand_arguments, forwarded_arguments, inspect, restore_toolchain,
    SubstitutionState,
};
use crate::{CommandContext, ExecutionOutcome, InstallUserError};

#[derive(Clone, Debug, Default)]
pub struct ArgsRequest {
    pub mode: Option<JmlMode>,
}

#[derive(Clone, Debug)]
pub struct ExecRequest {
    pub tool: Tool,
    pub args: Vec<String>,
}

/// Bootstraps the configured toolchain.
///
/// # Errors
/// Returns an error if any stage fails.
pub fn toolchain_init(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let plan = ctx.plan()?;
    let report = bootstrap(&plan, ctx.transport())?;
    let message = if report.is_noop() {
        format!(
            "OpenJML {} already bootstrapped in {}",
            report.version,
            report.root.display()
        )
    } else {
        format!(
            "OpenJML {} bootstrapped in {}",
            report.version,
            report.root.display()
        )
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "version": report.version,
            "root": report.root,
            "java_home": report.java_home,
            "performed": report.performed(),
            "stages": report.stages,
            "online": ctx.is_online(),
            "config": ctx.config().source(),
        }),
    ))
}

/// Reports every stage marker of the configured toolchain.
///
/// # Errors
/// Returns an error if the configured release or layout is invalid.
pub fn toolchain_status(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let plan = ctx.plan()?;
    let status = inspect(&plan);
    let details = serde_json::to_value(&status).context("failed to encode toolchain status")?;
    if status.is_broken() {
        let broken: Vec<String> = status
            .tools
            .iter()
            .filter(|tool| tool.substitution == SubstitutionState::Broken)
            .map(|tool| tool.tool.to_string())
            .collect();
        let mut outcome = ExecutionOutcome::user_error(
            format!("substitution is broken for {}", broken.join(", ")),
            details,
        );
        if let Some(map) = outcome.details.as_object_mut() {
            map.insert("reason".into(), json!("broken_substitution"));
            map.insert(
                "hint".into(),
                json!("Run `jmlup restore` to put the originals back, then `jmlup init`."),
            );
        }
        return Ok(outcome);
    }
    let message = if status.is_ready() {
        format!("OpenJML {} ready at {}", status.version, status.java_home.display())
    } else {
        format!("OpenJML {} not bootstrapped", status.version)
    };
    let mut outcome = ExecutionOutcome::success(message, details);
    if !status.is_ready() {
        if let Some(map) = outcome.details.as_object_mut() {
            map.insert("hint".into(), json!("Run `jmlup init` to bootstrap the toolchain."));
        }
    }
    Ok(outcome)
}

/// Moves the original `javac` and `java` back into place.
///
/// # Errors
/// Returns an error if a backup cannot be renamed.
pub fn toolchain_restore(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let plan = ctx.plan()?;
    let stages = restore_toolchain(&plan)?;
    let restored: Vec<String> = stages
        .iter()
        .filter(|stage| stage.outcome.performed())
        .filter_map(|stage| stage.tool.map(|tool| tool.to_string()))
        .collect();
    let message = if restored.is_empty() {
        "nothing to restore".to_string()
    } else {
        format!("restored original {}", restored.join(", "))
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "java_home": plan.layout().java_home(),
            "restored": restored,
            "stages": stages,
        }),
    ))
}

/// Prints the compiler arguments for the configured (or requested) checker mode.
///
/// # Errors
/// Returns an error if the configured release or layout is invalid.
pub fn checker_args(ctx: &CommandContext, request: &ArgsRequest) -> Result<ExecutionOutcome> {
    let plan = ctx.plan()?;
    let mut options = ctx.config().checker().clone();
    if let Some(mode) = request.mode {
        options.mode = mode;
    }
    let compiler_args = options.compiler_args();
    Ok(ExecutionOutcome::success(
        compiler_args.join(" "),
        json!({
            "passthrough": true,
            "mode": options.mode,
            "compiler_args": compiler_args,
            "runtime_jvm_args": options.runtime_jvm_args(),
            "runtime_classpath": [plan.layout().runtime_jar()],
            "java_home": plan.layout().java_home(),
        }),
    ))
}

/// Runs the original `javac`/`java` with response files expanded like the launchers do.
///
/// # Errors
/// Returns a user error when the toolchain has not been bootstrapped, or an error if the
/// program cannot be started.
pub fn toolchain_exec(ctx: &CommandContext, request: &ExecRequest) -> Result<ExecutionOutcome> {
    let plan = ctx.plan()?;
    let original = plan.original(request.tool);
    if !original.is_file() {
        return Err(InstallUserError::new(
            format!("{} has not been bootstrapped", request.tool),
            json!({
                "reason": "not_bootstrapped",
                "path": original,
                "hint": "Run `jmlup init` first.",
            }),
        )
        .into());
    }
    let cwd = env::current_dir().context("failed to read the working directory")?;
    let expanded = expand_arguments(&request.args, &cwd)?;
    let args = forwarded_arguments(&expanded);
    info!(tool = %request.tool, program = %original.display(), "forwarding to original executable");
    let code = run_command_passthrough(&original, &args, &cwd)?;
    Ok(ExecutionOutcome::success(
        String::new(),
        json!({
            "passthrough": true,
            "program": original,
            "args": args,
            "exit_code": code,
        }),
    ))
}
