use petgraph::algo::is_isomorphic_matching;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use crate::*;

/// An atom that remembers where it sits in the graph, so that a node
/// matcher comparing weights can also compare positions.
#[derive(Debug, Clone, Copy)]
struct Site {
    node: NodeIndex,
    atom: Atom,
}

/// Structural equivalence between components of one molecular graph.
///
/// Two components are equivalent when some automorphism of the whole graph
/// (atoms compared by element and radical count, bonds by order) maps one
/// onto the other. Queries are answered by pinning the requested images and
/// asking petgraph's VF2 matcher whether the graph is isomorphic to itself
/// under those pins. Morgan labels prune candidates first.
///
/// Nothing is written to the graph; every query is independent.
pub struct Equivalence {
    sites: UnGraph<Site, Bond>,
    labels: Vec<u64>,
}

impl Equivalence {
    pub fn new(graph: &MolecularGraph) -> Self {
        Self {
            sites: graph.map(|node, atom| Site { node, atom: *atom }, |_, bond| *bond),
            labels: morgan_labels(graph),
        }
    }

    fn label(&self, node: NodeIndex) -> u64 {
        self.labels[node.index()]
    }

    /// Returns true iff an automorphism sends every `a` to its `b`.
    pub fn automorphism_with(&self, pins: &[(NodeIndex, NodeIndex)]) -> bool {
        if pins
            .iter()
            .any(|&(a, b)| self.sites[a].atom != self.sites[b].atom || self.label(a) != self.label(b))
        {
            return false;
        }
        if pins.iter().all(|&(a, b)| a == b) {
            return true;
        }

        let image_of = |node: NodeIndex| pins.iter().find(|(a, _)| *a == node).map(|(_, b)| *b);
        let is_image = |node: NodeIndex| pins.iter().any(|(_, b)| *b == node);

        is_isomorphic_matching(
            &self.sites,
            &self.sites,
            |s0: &Site, s1: &Site| {
                if s0.atom != s1.atom || self.label(s0.node) != self.label(s1.node) {
                    return false;
                }
                match image_of(s0.node) {
                    Some(image) => image == s1.node,
                    None => !is_image(s1.node),
                }
            },
            |b0: &Bond, b1: &Bond| b0 == b1,
        )
    }

    pub fn nodes_equivalent(&self, a: NodeIndex, b: NodeIndex) -> bool {
        a == b || self.automorphism_with(&[(a, b)])
    }

    /// Some automorphism maps bond `e` onto bond `f`, in either orientation.
    pub fn edges_equivalent(&self, e: EdgeIndex, f: EdgeIndex) -> bool {
        if e == f {
            return true;
        }
        let (Some((a, b)), Some((c, d))) = (self.sites.edge_endpoints(e), self.sites.edge_endpoints(f)) else {
            return false;
        };
        if self.sites[e] != self.sites[f] {
            return false;
        }
        self.automorphism_with(&[(a, c), (b, d)]) || self.automorphism_with(&[(a, d), (b, c)])
    }

    /// Some automorphism keeps `center` in place and carries the substituent
    /// reached through bond `e` onto the one reached through bond `f`.
    pub fn substituents_equivalent(&self, center: NodeIndex, e: EdgeIndex, f: EdgeIndex) -> bool {
        if e == f {
            return true;
        }
        if self.sites[e] != self.sites[f] {
            return false;
        }
        let x = self.far_end(e, center);
        let y = self.far_end(f, center);
        self.automorphism_with(&[(center, center), (x, y)])
    }

    /// Some automorphism exchanges the two ends of bond `e`.
    pub fn ends_swappable(&self, e: EdgeIndex) -> bool {
        match self.sites.edge_endpoints(e) {
            Some((a, b)) if a != b => self.automorphism_with(&[(a, b), (b, a)]),
            _ => false,
        }
    }

    fn far_end(&self, edge: EdgeIndex, node: NodeIndex) -> NodeIndex {
        match self.sites.edge_endpoints(edge) {
            Some((a, b)) if a == node => b,
            Some((a, _)) => a,
            None => node,
        }
    }
}
