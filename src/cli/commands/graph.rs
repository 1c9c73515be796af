//! Graph command.
//!
//! Prints the stack's resources in creation order, with the references each
//! one waits on.

use clap::Parser;

use super::CommandContext;
use crate::error::Result;
use crate::output;

/// Arguments for the graph command.
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {}

impl GraphArgs {
    /// Execute the graph command.
    pub fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let stack = ctx.stack()?;
        let graph = stack.desired_state().dependency_graph();
        let order = graph.execution_order()?;

        output::banner("GRAPH");
        for (i, addr) in order.iter().enumerate() {
            let deps = graph.dependencies_of(addr);
            if deps.is_empty() {
                println!("{}. {}", i + 1, addr);
            } else {
                let deps: Vec<String> = deps.iter().map(ToString::to_string).collect();
                println!("{}. {} (after {})", i + 1, addr, deps.join(", "));
            }
        }
        Ok(0)
    }
}
