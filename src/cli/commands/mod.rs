//! Subcommand implementations.
//!
//! Each subcommand takes a [`CommandContext`] carrying the merged
//! configuration and the global CLI flags, and returns a process exit code.

pub mod apply;
pub mod graph;
pub mod output;
pub mod plan;
pub mod validate;

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::inputs::Inputs;
use crate::stack::Stack;
use crate::state::StateFile;

/// Shared context for command execution.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Merged configuration.
    pub config: Config,
    /// Raw `-v key=value` assignments from the CLI.
    pub var_assignments: Vec<String>,
    /// State file path after applying the CLI override.
    pub state_path: PathBuf,
}

impl CommandContext {
    /// Builds a context from parsed CLI arguments and loaded configuration.
    pub fn new(cli: &Cli, config: Config) -> Self {
        let state_path = cli
            .state
            .clone()
            .unwrap_or_else(|| config.defaults.state_path.clone());
        Self {
            config,
            var_assignments: cli.vars.clone(),
            state_path,
        }
    }

    /// Resolves and validates the required inputs.
    pub fn inputs(&self) -> Result<Inputs> {
        Inputs::resolve(&self.var_assignments)
    }

    /// Builds and validates the built-in stack from the inputs.
    pub fn stack(&self) -> Result<Stack> {
        let inputs = self.inputs()?;
        let stack = Stack::web_service(&inputs);
        stack.validate()?;
        Ok(stack)
    }

    /// Loads the recorded state.
    pub fn load_state(&self) -> Result<StateFile> {
        StateFile::load(&self.state_path)
    }
}
