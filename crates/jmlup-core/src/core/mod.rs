//! Internal implementation modules for `jmlup-core`.
//!
//! Callers should go through the re-exports at the crate root.

pub mod bootstrap;
pub mod config;
pub(crate) mod fs;
pub(crate) mod net;
pub mod toolchain;
pub mod tooling;
