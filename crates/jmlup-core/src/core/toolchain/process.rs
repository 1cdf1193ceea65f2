use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

/// Runs `program` with inherited stdio and returns its exit code (`-1` when killed by a signal).
pub(crate) fn run_command_passthrough(program: &Path, args: &[String], cwd: &Path) -> Result<i32> {
    debug!(program = %program.display(), ?args, "running");
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to start {}", program.display()))?;
    Ok(status.code().unwrap_or(-1))
}
