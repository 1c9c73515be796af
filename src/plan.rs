//! Plan construction.
//!
//! A plan is the diff between the desired-state description and the recorded
//! state, expressed as per-resource actions in dependency order. The built-in
//! stack only ever creates; a resource already recorded is a no-op. Plan
//! construction is entirely offline: the image lookup is resolved at apply
//! time, not here.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resources::ResourceAddr;
use crate::stack::DesiredState;
use crate::state::StateFile;

/// The action apply would take for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// The resource is not recorded and will be created.
    Create {
        /// Resource address.
        addr: ResourceAddr,
    },
    /// The resource is already recorded; nothing to do.
    Noop {
        /// Resource address.
        addr: ResourceAddr,
    },
}

impl Action {
    /// The address this action concerns.
    pub fn addr(&self) -> &ResourceAddr {
        match self {
            Action::Create { addr } | Action::Noop { addr } => addr,
        }
    }
}

/// An ordered set of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Actions in dependency order.
    pub actions: Vec<Action>,
}

impl Plan {
    /// Diffs the desired state against the recorded state.
    pub fn build(desired: &DesiredState, state: &StateFile) -> Result<Self> {
        let order = desired.dependency_graph().execution_order()?;
        let actions = order
            .into_iter()
            .map(|addr| {
                if state.contains(&addr) {
                    Action::Noop { addr }
                } else {
                    Action::Create { addr }
                }
            })
            .collect();
        Ok(Self { actions })
    }

    /// Number of resources the plan would create.
    pub fn to_add(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Create { .. }))
            .count()
    }

    /// Number of resources left untouched.
    pub fn unchanged(&self) -> usize {
        self.actions.len() - self.to_add()
    }

    /// Whether apply would do nothing.
    pub fn is_empty(&self) -> bool {
        self.to_add() == 0
    }

    /// Create actions in order.
    pub fn creates(&self) -> impl Iterator<Item = &ResourceAddr> {
        self.actions.iter().filter_map(|a| match a {
            Action::Create { addr } => Some(addr),
            Action::Noop { .. } => None,
        })
    }
}
