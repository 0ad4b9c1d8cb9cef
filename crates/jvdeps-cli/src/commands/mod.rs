//! Command implementations.
//!
//! Each command takes the shared [`CommandContext`] and its parsed arguments.

pub mod config;
pub mod discover;
pub mod parse;
pub mod resolve;
pub(crate) mod utils;

use std::path::PathBuf;

use jvdeps_config::{ConfigDiscovery, JvdepsConfig};
use path_clean::PathClean;

use crate::cli::Cli;
use crate::error::Result;

pub use config::execute as config_execute;
pub use parse::execute as parse_execute;
pub use resolve::execute as resolve_execute;

/// Workspace root and merged configuration, shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub root: PathBuf,
    pub config: JvdepsConfig,
}

impl CommandContext {
    pub fn new(root: impl Into<PathBuf>, config: JvdepsConfig) -> Self {
        Self {
            root: root.into().clean(),
            config,
        }
    }

    /// Merge defaults, the config file, the environment and the command's
    /// own overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.workspace.clean();
        let config = ConfigDiscovery::new(&root).load(cli.config.as_deref(), &cli.command.overrides())?;
        Ok(Self { root, config })
    }
}
