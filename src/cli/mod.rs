//! CLI module for Rustform.
//!
//! This module provides the command-line interface for Rustform, including
//! argument parsing, configuration loading, and subcommand handling.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rustform - a minimal declarative cloud provisioning tool
///
/// Describes a single web service host (image lookup, SSH security group,
/// compute instance) and converges it against AWS EC2.
#[derive(Parser, Debug, Clone)]
#[command(name = "rustform")]
#[command(author = "Rustform Contributors")]
#[command(version)]
#[command(about = "A minimal declarative cloud provisioning tool written in Rust", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Input variables (key=value), e.g. -v ssh_cidr=203.0.113.0/24
    #[arg(short = 'v', long = "var", global = true, action = clap::ArgAction::Append)]
    pub vars: Vec<String>,

    /// Verbosity level (--verbose, --verbose --verbose, ...)
    #[arg(long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "RUSTFORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the state file (overrides configuration)
    #[arg(short = 's', long, global = true, env = "RUSTFORM_STATE")]
    pub state: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Current verbosity level.
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate inputs and the stack's internal references
    Validate(commands::validate::ValidateArgs),

    /// Show the actions apply would take
    Plan(commands::plan::PlanArgs),

    /// Create the declared resources and record them in the state file
    Apply(commands::apply::ApplyArgs),

    /// Print recorded output values
    Output(commands::output::OutputArgs),

    /// Print the resource dependency order
    Graph(commands::graph::GraphArgs),
}
