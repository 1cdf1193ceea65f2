use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::bootstrap::{BootstrapPlan, ReleaseTransport, SystemTransport};
use crate::core::config::{Config, GlobalOptions};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommandGroup {
    Init,
    Status,
    Restore,
    Args,
    Exec,
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    transport: Arc<dyn ReleaseTransport>,
}

impl<'a> CommandContext<'a> {
    /// Creates a command context with the provided global options.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded.
    pub fn new(global: &'a GlobalOptions) -> Result<Self> {
        let config = Config::load(global)?;
        Ok(Self::with_config(global, config))
    }

    #[must_use]
    pub fn with_config(global: &'a GlobalOptions, config: Config) -> Self {
        let transport = Arc::new(SystemTransport::new(config.network().online));
        Self {
            global,
            config,
            transport,
        }
    }

    /// Swaps the release transport, e.g. for a mirror or a test double.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn ReleaseTransport>) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &dyn ReleaseTransport {
        self.transport.as_ref()
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.config.network().online
    }

    /// Builds the bootstrap plan for this invocation.
    ///
    /// # Errors
    /// Returns an error if the configured release or layout is invalid.
    pub fn plan(&self) -> Result<BootstrapPlan> {
        self.config.plan()
    }
}
