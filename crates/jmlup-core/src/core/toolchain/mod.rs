//! Command handlers for the toolchain lifecycle.

pub(crate) mod process;
pub mod toolchain_cli;

pub use toolchain_cli::{
    checker_args, toolchain_exec, toolchain_init, toolchain_restore, toolchain_status,
    ArgsRequest, ExecRequest,
};
