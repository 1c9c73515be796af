//! Output command.
//!
//! Prints output values recorded by the last successful apply.

use clap::Parser;

use super::CommandContext;
use crate::error::{Error, Result};
use crate::output;

/// Arguments for the output command.
#[derive(Parser, Debug, Clone)]
pub struct OutputArgs {
    /// Name of a single output to print (raw value, no decoration)
    pub name: Option<String>,

    /// Emit all outputs as JSON
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    /// Execute the output command.
    pub fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let state = ctx.load_state()?;

        if let Some(ref name) = self.name {
            let value = state
                .outputs
                .get(name)
                .ok_or_else(|| Error::OutputNotFound(name.clone()))?;
            println!("{value}");
            return Ok(0);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&state.outputs)?);
            return Ok(0);
        }

        if state.outputs.is_empty() {
            output::warning("No outputs recorded; run apply first");
            return Ok(0);
        }
        for (name, value) in &state.outputs {
            output::output(name, value);
        }
        Ok(0)
    }
}
