//! Validate command.
//!
//! Checks the required inputs and the stack's internal references without
//! touching the provider or the state file.

use clap::Parser;

use super::CommandContext;
use crate::error::Result;
use crate::output;

/// Arguments for the validate command.
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate command.
    pub fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let stack = ctx.stack()?;
        let desired = stack.desired_state();

        output::banner("VALIDATE");
        println!(
            "Stack '{}' is valid: {} resources, {} output(s)",
            stack.name,
            desired.resources.len(),
            desired.outputs.len()
        );
        Ok(0)
    }
}
