use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("compute dependency graph contains a cycle")]
    Cycle,
}

/// Dependency graph between states and computes.
///
/// An edge `from -> to` means `to` reads `from`, so when `from` changes
/// `to` must recompute. Nodes are registered in insertion order and the
/// topological sort is stable with respect to that order.
#[derive(Default)]
pub struct Graph {
    edges: HashMap<TypeId, Vec<TypeId>>,
    nodes: Vec<TypeId>,
}

impl Graph {
    pub fn add_node(&mut self, node: TypeId) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    pub fn route_to(&mut self, from: TypeId, to: TypeId) {
        self.add_node(from);
        self.add_node(to);
        let outgoing = self.edges.entry(from).or_default();
        if !outgoing.contains(&to) {
            outgoing.push(to);
        }
    }

    /// Every node reachable from `root`, excluding `root` itself.
    pub fn dependents_of(&self, root: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        let mut out = Vec::new();
        queue.push_back(root);
        seen.insert(root);
        while let Some(node) = queue.pop_front() {
            if let Some(next) = self.edges.get(&node) {
                for &dep in next {
                    if seen.insert(dep) {
                        out.push(dep);
                        queue.push_back(dep);
                    }
                }
            }
        }
        out
    }

    /// Kahn topological sort over all registered nodes.
    pub fn topology_sort(&self) -> Result<Vec<TypeId>, TopologyError> {
        let mut indegree: HashMap<TypeId, usize> =
            self.nodes.iter().map(|&n| (n, 0)).collect();
        for targets in self.edges.values() {
            for to in targets {
                if let Some(count) = indegree.get_mut(to) {
                    *count += 1;
                }
            }
        }

        let mut queue: VecDeque<TypeId> = self
            .nodes
            .iter()
            .copied()
            .filter(|n| indegree[n] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            if let Some(targets) = self.edges.get(&node) {
                for to in targets {
                    if let Some(count) = indegree.get_mut(to) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(*to);
                        }
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(TopologyError::Cycle)
        }
    }
}
