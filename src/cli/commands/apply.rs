//! Apply command.
//!
//! Builds the plan and converges it against the provider, recording every
//! created resource in the state file. `--check` prints the plan and stops
//! before any provider call, like plan.

use clap::Parser;

use super::CommandContext;
use crate::engine::{ApplyOptions, Provisioner};
use crate::error::Result;
use crate::output;
use crate::plan::{Action, Plan};

/// Arguments for the apply command.
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// Dry run: show the plan, make no provider calls
    #[arg(long)]
    pub check: bool,

    /// Do not wait for the instance to reach the running state
    #[arg(long)]
    pub no_wait: bool,

    /// Timeout for wait operations in seconds (overrides configuration)
    #[arg(long)]
    pub wait_timeout: Option<u64>,
}

impl ApplyArgs {
    /// Execute the apply command.
    pub async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let stack = ctx.stack()?;
        let desired = stack.desired_state();
        let mut state = ctx.load_state()?;
        let plan = Plan::build(desired, &state)?;

        if self.check {
            output::banner("APPLY (CHECK MODE)");
            output::warning("No changes will be made to the provider");
            output::plan(&plan);
            return Ok(0);
        }

        output::banner("APPLY");
        if plan.is_empty() {
            for action in &plan.actions {
                if let Action::Noop { addr } = action {
                    output::unchanged(&addr.to_string());
                }
            }
            println!("\nNothing to do. The recorded state matches the desired state.");
            return Ok(0);
        }

        let options = ApplyOptions {
            region: ctx.config.defaults.region.clone(),
            state_path: ctx.state_path.clone(),
            wait: ctx.config.defaults.wait && !self.no_wait,
            wait_timeout: self
                .wait_timeout
                .unwrap_or(ctx.config.defaults.wait_timeout),
        };

        let provisioner = Provisioner::connect(options).await;
        let report = provisioner.apply(desired, &plan, &mut state).await?;

        for action in &plan.actions {
            if let Action::Noop { addr } = action {
                output::unchanged(&addr.to_string());
            }
        }
        for addr in &report.created {
            let id = state
                .get(addr)
                .map(|r| r.id.clone())
                .unwrap_or_default();
            output::created(&addr.to_string(), &id);
        }
        println!();
        output::summary(report.created.len(), report.unchanged);

        if !report.outputs.is_empty() {
            output::banner("OUTPUTS");
            for (name, value) in &report.outputs {
                output::output(name, value);
            }
        }
        Ok(0)
    }
}
