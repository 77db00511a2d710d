//! Inheritance graph queries
//!
//! Parent edges are stored in a petgraph directed graph owned by the class
//! registry; an edge points from a class to one of its parents and carries the
//! parent's position in the declared parent list. Queries run a breadth-first
//! search per call, which keeps redefinition trivial: nothing is cached.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Shortest inheritance path length between two classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Finite(u32),
    Unreachable,
}

impl Distance {
    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn value(self) -> Option<u32> {
        match self {
            Distance::Finite(n) => Some(n),
            Distance::Unreachable => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(n) => write!(f, "{n}"),
            Distance::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Read-only view over the registry's inheritance edges
#[derive(Clone, Copy)]
pub struct ClassGraph<'a> {
    graph: &'a DiGraph<String, u32>,
    nodes: &'a HashMap<String, NodeIndex>,
}

impl<'a> ClassGraph<'a> {
    pub(crate) fn new(graph: &'a DiGraph<String, u32>, nodes: &'a HashMap<String, NodeIndex>) -> Self {
        Self { graph, nodes }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// All classes reachable from `name`, itself first, each at its shortest
    /// distance. Ties at equal distance keep declared parent order.
    pub fn ancestors(&self, name: &str) -> Option<Vec<(String, u32)>> {
        let start = *self.nodes.get(name)?;
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0u32)]);
        let mut ancestors = Vec::new();

        while let Some((node, depth)) = queue.pop_front() {
            ancestors.push((self.graph[node].clone(), depth));
            for parent in self.parents_in_order(node) {
                if seen.insert(parent) {
                    queue.push_back((parent, depth + 1));
                }
            }
        }

        Some(ancestors)
    }

    /// Shortest path length from `from` up to `to`
    pub fn distance(&self, from: &str, to: &str) -> Distance {
        let (Some(&start), Some(&target)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return Distance::Unreachable;
        };

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0u32)]);
        while let Some((node, depth)) = queue.pop_front() {
            if node == target {
                return Distance::Finite(depth);
            }
            for parent in self.parents_in_order(node) {
                if seen.insert(parent) {
                    queue.push_back((parent, depth + 1));
                }
            }
        }

        Distance::Unreachable
    }

    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.distance(class, ancestor).is_finite()
    }

    // petgraph yields the newest edge first; the edge weight restores declared order
    fn parents_in_order(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(u32, NodeIndex)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect();
        edges.sort_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, target)| target).collect()
    }
}
