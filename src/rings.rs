use std::collections::{HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::*;

/// One elementary cycle of the graph's cycle basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn shares_component_with(&self, other: &Cycle) -> bool {
        self.nodes.iter().any(|node| other.nodes.contains(node))
            || self.edges.iter().any(|edge| other.edges.contains(edge))
    }
}

/// Ring membership of every atom and bond, found once per graph.
#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    cycles: Vec<Cycle>,
    ring_nodes: HashSet<NodeIndex>,
    ring_edges: HashSet<EdgeIndex>,
}

impl RingInfo {
    /// Finds a cycle basis with a depth-first search: every back edge closes
    /// exactly one cycle, running from the ancestor it reaches down the tree
    /// to the atom it leaves.
    pub fn identify(graph: &MolecularGraph) -> Self {
        let mut search = CycleSearch {
            graph,
            parent: HashMap::new(),
            visited: HashSet::new(),
            used_edges: HashSet::new(),
            cycles: Vec::new(),
        };
        for node in graph.node_indices() {
            if !search.visited.contains(&node) {
                search.visit(node);
            }
        }

        let cycles = search.cycles;
        let ring_nodes = cycles.iter().flat_map(|c| c.nodes.iter().copied()).collect();
        let ring_edges = cycles.iter().flat_map(|c| c.edges.iter().copied()).collect();
        Self {
            cycles,
            ring_nodes,
            ring_edges,
        }
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn node_in_cycle(&self, node: NodeIndex) -> bool {
        self.ring_nodes.contains(&node)
    }

    pub fn edge_in_cycle(&self, edge: EdgeIndex) -> bool {
        self.ring_edges.contains(&edge)
    }
}

struct CycleSearch<'g> {
    graph: &'g MolecularGraph,
    parent: HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
    visited: HashSet<NodeIndex>,
    used_edges: HashSet<EdgeIndex>,
    cycles: Vec<Cycle>,
}

impl CycleSearch<'_> {
    fn visit(&mut self, node: NodeIndex) {
        self.visited.insert(node);
        let edges: Vec<EdgeIndex> = self.graph.edges(node).map(|edge| edge.id()).collect();
        for edge in edges {
            if !self.used_edges.insert(edge) {
                continue;
            }
            let next = other_end(self.graph, edge, node);
            if next == node {
                continue;
            }
            if self.visited.contains(&next) {
                // In an undirected DFS an unused edge to a visited atom always
                // leads back to an ancestor that is still open.
                self.close_cycle(node, next, edge);
            } else {
                self.parent.insert(next, (node, edge));
                self.visit(next);
            }
        }
    }

    fn close_cycle(&mut self, from: NodeIndex, ancestor: NodeIndex, closing: EdgeIndex) {
        let mut nodes = vec![from];
        let mut edges = vec![closing];
        let mut current = from;
        while current != ancestor {
            let Some(&(up, edge)) = self.parent.get(&current) else {
                break;
            };
            edges.push(edge);
            nodes.push(up);
            current = up;
        }
        nodes.reverse();
        edges.reverse();
        self.cycles.push(Cycle { nodes, edges });
    }
}
