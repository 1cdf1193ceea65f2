use jmlup_core::{
    ArgsRequest, CommandContext, CommandGroup, CommandInfo, ExecRequest, ExecutionOutcome,
};

use crate::cli::CommandGroupCli;

pub fn command_info(group: &CommandGroupCli) -> CommandInfo {
    match group {
        CommandGroupCli::Init => CommandInfo::new(CommandGroup::Init, "init"),
        CommandGroupCli::Status => CommandInfo::new(CommandGroup::Status, "status"),
        CommandGroupCli::Restore => CommandInfo::new(CommandGroup::Restore, "restore"),
        CommandGroupCli::Args(_) => CommandInfo::new(CommandGroup::Args, "args"),
        CommandGroupCli::Exec(_) => CommandInfo::new(CommandGroup::Exec, "exec"),
    }
}

pub fn dispatch_command(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> (CommandInfo, ExecutionOutcome) {
    let info = command_info(group);
    match group {
        CommandGroupCli::Init => core_call(info, || jmlup_core::toolchain_init(ctx)),
        CommandGroupCli::Status => core_call(info, || jmlup_core::toolchain_status(ctx)),
        CommandGroupCli::Restore => core_call(info, || jmlup_core::toolchain_restore(ctx)),
        CommandGroupCli::Args(args) => {
            let request = ArgsRequest { mode: args.mode };
            core_call(info, || jmlup_core::checker_args(ctx, &request))
        }
        CommandGroupCli::Exec(args) => {
            let request = ExecRequest {
                tool: args.tool,
                args: args.args.clone(),
            };
            core_call(info, || jmlup_core::toolchain_exec(ctx, &request))
        }
    }
}

fn core_call<F>(info: CommandInfo, action: F) -> (CommandInfo, ExecutionOutcome)
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    tracing::debug!(command = info.name, "running");
    match action() {
        Ok(outcome) => (info, outcome),
        Err(err) => (info, jmlup_core::error_outcome(&err)),
    }
}
