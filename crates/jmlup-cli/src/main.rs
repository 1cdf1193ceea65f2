use atty::Stream;
use clap::Parser;
use color_eyre::Result;
use jmlup_core::{CommandContext, GlobalOptions, ToolchainOverrides};

mod cli;
mod dispatch;
mod output;
mod style;

use cli::JmlupCli;
use output::OutputOptions;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = JmlupCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
        offline: cli.offline,
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        toolchain: ToolchainOverrides {
            root: cli.toolchain.root.clone(),
            version: cli.toolchain.release.clone(),
            url_template: cli.toolchain.url_template.clone(),
            sha256: cli.toolchain.sha256.clone(),
            java_home_subdir: cli.toolchain.java_home_subdir.clone(),
        },
    };
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };

    let (info, outcome) = match CommandContext::new(&global) {
        Ok(ctx) => dispatch::dispatch_command(&ctx, &cli.command),
        Err(err) => (
            dispatch::command_info(&cli.command),
            jmlup_core::error_outcome(&err),
        ),
    };
    let code = output::emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("jmlup={level},jmlup_core={level},jmlup_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(Stream::Stderr))
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
