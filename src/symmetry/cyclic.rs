use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;
use tracing::*;

use super::{combine_symmetry, SymmetryContext};
use crate::*;

/// A maximal group of cycles that transitively share atoms or bonds, such as
/// the two rings of a spiro or fused bicycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingStructure {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
}

/// Merges cycles that share any component. Structures, and the nodes and
/// edges inside them, keep the order in which they first appear.
pub fn ring_structures(cycles: &[Cycle]) -> Vec<RingStructure> {
    let mut sets = UnionFind::<usize>::new(cycles.len());
    for (i, first) in cycles.iter().enumerate() {
        for (j, second) in cycles.iter().enumerate().skip(i + 1) {
            if first.shares_component_with(second) {
                sets.union(i, j);
            }
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut structures: Vec<RingStructure> = Vec::new();
    for (i, cycle) in cycles.iter().enumerate() {
        let root = sets.find(i);
        let position = match roots.iter().position(|&r| r == root) {
            Some(position) => position,
            None => {
                roots.push(root);
                structures.push(RingStructure {
                    nodes: Vec::new(),
                    edges: Vec::new(),
                });
                structures.len() - 1
            }
        };
        let structure = &mut structures[position];
        for &node in &cycle.nodes {
            if !structure.nodes.contains(&node) {
                structure.nodes.push(node);
            }
        }
        for &edge in &cycle.edges {
            if !structure.edges.contains(&edge) {
                structure.edges.push(edge);
            }
        }
    }
    structures
}

/// Greedy partition into classes of equivalent items.
///
/// Each unassigned item opens a class, and every later unassigned item that is
/// equivalent to some member joins it.
pub fn equivalence_classes<T: Copy>(items: &[T], equivalent: impl Fn(T, T) -> bool) -> Vec<Vec<T>> {
    let mut assigned = vec![false; items.len()];
    let mut classes = Vec::new();
    for i in 0..items.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut class = vec![items[i]];
        for j in i + 1..items.len() {
            if !assigned[j] && class.iter().any(|&member| equivalent(member, items[j])) {
                assigned[j] = true;
                class.push(items[j]);
            }
        }
        classes.push(class);
    }
    classes
}

fn largest_class<T: Copy>(items: &[T], equivalent: impl Fn(T, T) -> bool) -> u32 {
    equivalence_classes(items, equivalent)
        .iter()
        .map(|class| class.len() as u32)
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Symmetry contributed by one ring structure.
pub fn ring_symmetry(ctx: &SymmetryContext, ring: &RingStructure) -> u32 {
    let equivalence = ctx.equivalence();
    let node_sn = largest_class(&ring.nodes, |a, b| equivalence.nodes_equivalent(a, b));
    let arc_sn = largest_class(&ring.edges, |e, f| equivalence.edges_equivalent(e, f));

    let fully_symmetric = node_sn as usize == ring.nodes.len() && arc_sn as usize == ring.edges.len();
    let sn = if fully_symmetric {
        if ring.nodes.first().is_some_and(|&node| has_unequal_exocyclic_pair(ctx, node)) {
            node_sn
        } else {
            node_sn * 2
        }
    } else {
        node_sn.max(arc_sn)
    };
    trace!(nodes = ring.nodes.len(), node_sn, arc_sn, sn, "ring symmetry");
    sn
}

/// A saturated carbon with exactly two bonds leaving the ring, carrying
/// substituents that cannot be exchanged. Such a ring atom can be turned by
/// the ring's rotation but cannot be mirrored onto itself.
fn has_unequal_exocyclic_pair(ctx: &SymmetryContext, node: NodeIndex) -> bool {
    if ctx.tag(node) != FgElement::Cs {
        return false;
    }
    let exocyclic: Vec<EdgeIndex> = ctx
        .bonds_of(node)
        .into_iter()
        .filter(|&edge| !ctx.rings().edge_in_cycle(edge))
        .collect();
    match exocyclic.as_slice() {
        [e, f] => !ctx.equivalence().substituents_equivalent(node, *e, *f),
        _ => false,
    }
}

/// Product of the symmetry of every ring structure in the graph.
pub fn cyclic_symmetry(ctx: &SymmetryContext) -> Result<u32, ChemGraphError> {
    let structures = ring_structures(ctx.rings().cycles());
    debug!(structures = structures.len(), "ring structures");
    structures
        .iter()
        .try_fold(1, |product, ring| combine_symmetry(product, ring_symmetry(ctx, ring), "ring"))
}
