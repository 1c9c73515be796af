//! # Rustform - A Minimal Declarative Cloud Provisioning Tool
//!
//! Rustform carries a single built-in stack describing one web service host:
//! a machine-image lookup, a security group restricting inbound
//! administrative access to a caller-supplied address range, and a compute
//! instance referencing both, with the instance's public DNS name as the one
//! derived output.
//!
//! ## Core Concepts
//!
//! - **Inputs**: the two required caller-supplied values (`ssh_cidr`,
//!   `key_name`), validated before anything else happens
//! - **Stack**: the typed desired-state description built from the inputs
//! - **Graph**: reference edges between resources, walked in topological
//!   order so dependencies exist before their dependents
//! - **Plan**: the offline diff between desired and recorded state
//! - **State**: the JSON record of what has already been created
//! - **Engine**: the converge loop issuing the minimal provider calls
//!
//! ## Quick Example
//!
//! ```rust
//! use rustform::inputs::Inputs;
//! use rustform::plan::Plan;
//! use rustform::stack::Stack;
//! use rustform::state::StateFile;
//!
//! # fn main() -> rustform::error::Result<()> {
//! let inputs = Inputs::resolve(&[
//!     "ssh_cidr=203.0.113.0/24".to_string(),
//!     "key_name=deployer".to_string(),
//! ])?;
//!
//! let stack = Stack::web_service(&inputs);
//! stack.validate()?;
//!
//! // A fresh state plans all three resources.
//! let plan = Plan::build(stack.desired_state(), &StateFile::default())?;
//! assert_eq!(plan.to_add(), 3);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod inputs;
pub mod output;
pub mod plan;
pub mod resources;
pub mod stack;
pub mod state;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    //! Quick access to the most commonly needed types.

    pub use crate::config::Config;
    pub use crate::engine::{ApplyOptions, ApplyReport, Provisioner};
    pub use crate::error::{Error, ErrorContext, Result};
    pub use crate::graph::DependencyGraph;
    pub use crate::inputs::{CidrBlock, Inputs};
    pub use crate::plan::{Action, Plan};
    pub use crate::resources::{ResourceAddr, ResourceKind, ResourceSpec};
    pub use crate::stack::{DesiredState, Stack};
    pub use crate::state::{RecordedResource, StateFile};
}
