use std::path::PathBuf;

use clap::{value_parser, ArgAction, Args, Parser, Subcommand};
use jmlup_domain::{JmlMode, Tool};

pub const JMLUP_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const JMLUP_BEFORE_HELP: &str = concat!(
    "jmlup ",
    env!("CARGO_PKG_VERSION"),
    " – OpenJML toolchain bootstrapper\n\n",
    "\x1b[1;36mCommands\x1b[0m\n",
    "  init             Download, unpack, and substitute javac/java with OpenJML launchers.\n",
    "  status           Show which bootstrap stages are complete.\n",
    "  restore          Put the original javac/java back under their own names.\n",
    "  args             Print the JML compiler arguments for the selected mode.\n",
    "  exec             Run the original javac/java with @file arguments expanded.\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = JMLUP_BEFORE_HELP,
    help_template = JMLUP_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct JmlupCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_name = "PATH",
        value_parser = value_parser!(PathBuf),
        help = "Read settings from this TOML file instead of ./jmlup.toml",
        global = true
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        help = "Never touch the network; local archives still work (sets JMLUP_ONLINE=0)",
        global = true
    )]
    pub offline: bool,
    #[command(flatten)]
    pub toolchain: ToolchainArgs,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Args, Debug, Default)]
pub struct ToolchainArgs {
    #[arg(
        long,
        value_name = "DIR",
        value_parser = value_parser!(PathBuf),
        help = "Toolchain root (default: .openjml)",
        global = true
    )]
    pub root: Option<PathBuf>,
    #[arg(
        long = "release",
        value_name = "VERSION",
        help = "OpenJML release tag (default: 0.17.0-alpha-15)",
        global = true
    )]
    pub release: Option<String>,
    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "Download URL or path containing {version}",
        global = true
    )]
    pub url_template: Option<String>,
    #[arg(
        long,
        value_name = "HEX",
        help = "Expected SHA-256 of the release archive",
        global = true
    )]
    pub sha256: Option<String>,
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory inside the unpacked archive that holds bin/javac (default: jdk for published releases)",
        global = true
    )]
    pub java_home_subdir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Bootstrap OpenJML and substitute javac/java (idempotent).",
        override_usage = "jmlup init [--release VERSION] [--root DIR] [--sha256 HEX]"
    )]
    Init,
    #[command(about = "Report which bootstrap stages are complete (read-only).")]
    Status,
    #[command(about = "Move the original javac/java back into place.")]
    Restore,
    #[command(
        about = "Print the JML compiler arguments (mode from --mode, JML_MODE, or config).",
        override_usage = "jmlup args [--mode rac|esc]"
    )]
    Args(ArgsArgs),
    #[command(
        about = "Run the original javac/java with @file arguments expanded.",
        override_usage = "jmlup exec <javac|java> [-- <ARG>...]"
    )]
    Exec(ExecArgs),
}

#[derive(Args, Debug)]
pub struct ArgsArgs {
    #[arg(long, value_name = "MODE", help = "Checker mode: rac or esc")]
    pub mode: Option<JmlMode>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[arg(value_name = "TOOL", help = "javac or java")]
    pub tool: Tool,
    #[arg(
        value_name = "ARG",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..,
        help = "Arguments to forward; @path expands to the lines of that file"
    )]
    pub args: Vec<String>,
}
