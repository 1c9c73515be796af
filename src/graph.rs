//! Resource dependency tracking.
//!
//! Reference edges between resources form a directed graph; apply walks it in
//! topological order so that everything a resource references exists before
//! the resource itself. Cycles are rejected at validation time.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Error, Result};
use crate::resources::ResourceAddr;

/// Directed graph of reference edges between resources.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ResourceAddr, ()>,
    node_indices: HashMap<ResourceAddr, NodeIndex>,
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource node; adding the same address twice is a no-op.
    pub fn add_resource(&mut self, addr: ResourceAddr) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&addr) {
            return idx;
        }
        let idx = self.graph.add_node(addr.clone());
        self.node_indices.insert(addr, idx);
        idx
    }

    /// Records that `to` references `from`, i.e. `from` must exist first.
    pub fn add_reference(&mut self, from: ResourceAddr, to: ResourceAddr) {
        let from_idx = self.add_resource(from);
        let to_idx = self.add_resource(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Number of resources in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of a resource (the addresses it references).
    pub fn dependencies_of(&self, addr: &ResourceAddr) -> Vec<ResourceAddr> {
        let Some(&idx) = self.node_indices.get(addr) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Returns the addresses in creation order, or an error naming a
    /// resource on a cycle.
    pub fn execution_order(&self) -> Result<Vec<ResourceAddr>> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|idx| self.graph[idx].clone()).collect()),
            Err(cycle) => Err(Error::DependencyCycle(
                self.graph[cycle.node_id()].to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    fn addr(kind: ResourceKind, name: &str) -> ResourceAddr {
        ResourceAddr::new(kind, name)
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        let ami = addr(ResourceKind::Ami, "web");
        let sg = addr(ResourceKind::SecurityGroup, "web_ssh");
        let instance = addr(ResourceKind::Instance, "web");

        let mut graph = DependencyGraph::new();
        graph.add_resource(ami.clone());
        graph.add_resource(sg.clone());
        graph.add_resource(instance.clone());
        graph.add_reference(ami.clone(), instance.clone());
        graph.add_reference(sg.clone(), instance.clone());

        let order = graph.execution_order().unwrap();
        assert_eq!(order.len(), 3);
        let pos = |a: &ResourceAddr| order.iter().position(|o| o == a).unwrap();
        assert!(pos(&ami) < pos(&instance));
        assert!(pos(&sg) < pos(&instance));
    }

    #[test]
    fn duplicate_nodes_and_edges_collapse() {
        let ami = addr(ResourceKind::Ami, "web");
        let instance = addr(ResourceKind::Instance, "web");

        let mut graph = DependencyGraph::new();
        graph.add_resource(ami.clone());
        graph.add_resource(ami.clone());
        graph.add_reference(ami.clone(), instance.clone());
        graph.add_reference(ami.clone(), instance.clone());

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.dependencies_of(&instance), vec![ami]);
    }

    #[test]
    fn cycle_is_detected() {
        let a = addr(ResourceKind::Ami, "a");
        let b = addr(ResourceKind::Instance, "b");

        let mut graph = DependencyGraph::new();
        graph.add_reference(a.clone(), b.clone());
        graph.add_reference(b, a);

        let err = graph.execution_order().unwrap_err();
        assert!(matches!(err, Error::DependencyCycle(_)));
    }
}
