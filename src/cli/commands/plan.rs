//! Plan command.
//!
//! Diffs the desired state against the recorded state and prints the actions
//! apply would take. Entirely offline.

use clap::Parser;

use super::CommandContext;
use crate::error::Result;
use crate::output;
use crate::plan::Plan;

/// Arguments for the plan command.
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// Emit the plan as JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    /// Execute the plan command.
    pub fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let stack = ctx.stack()?;
        let state = ctx.load_state()?;
        let plan = Plan::build(stack.desired_state(), &state)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            return Ok(0);
        }

        output::banner("PLAN");
        if plan.is_empty() {
            println!("No changes. The recorded state matches the desired state.");
        } else {
            println!(
                "{} resource(s) to add. Actions in dependency order:\n",
                plan.to_add()
            );
        }
        output::plan(&plan);
        Ok(0)
    }
}
