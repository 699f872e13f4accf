use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use petgraph::visit::EdgeRef;

use crate::*;

/// Computes a hash value for any hashable object.
fn compute_hash<T: Hash>(t: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    t.hash(&mut hasher);
    hasher.finish()
}

/// Provides an initial label for an atom from its atomic number and its
/// radical count.
fn initial_label(atom: &Atom) -> u64 {
    atom.element.atomic_number() as u64 * 16 + atom.radicals as u64
}

fn count_distinct(labels: &[u64]) -> usize {
    labels.iter().collect::<HashSet<_>>().len()
}

/// Implements the Morgan algorithm for a molecular graph.
///
/// Every atom starts from a label derived from its element and radical
/// count. Each round replaces a label with a hash of the label and the
/// sorted `(bond order, neighbor label)` pairs around the atom. Refinement
/// stops once a round no longer splits any class, which takes at most one
/// round per atom.
///
/// The labels are invariant under graph automorphisms: two atoms with
/// different labels can never be mapped onto each other. The converse does
/// not hold, so equal labels only nominate candidates.
///
/// # Returns
/// One label per node, indexed by `NodeIndex::index()`.
pub fn morgan_labels(graph: &MolecularGraph) -> Vec<u64> {
    let mut labels: Vec<u64> = graph
        .node_indices()
        .map(|node| initial_label(&graph[node]))
        .collect();
    let mut classes = count_distinct(&labels);

    for _ in 0..graph.node_count() {
        let updated: Vec<u64> = graph
            .node_indices()
            .map(|node| {
                let mut neighbor_labels: Vec<(u8, u64)> = graph
                    .edges(node)
                    .map(|edge| {
                        let neighbor = other_end(graph, edge.id(), node);
                        (edge.weight().order(), labels[neighbor.index()])
                    })
                    .collect();
                neighbor_labels.sort_unstable();
                compute_hash(&(labels[node.index()], neighbor_labels))
            })
            .collect();

        let refined = count_distinct(&updated);
        labels = updated;
        if refined == classes {
            break;
        }
        classes = refined;
    }

    labels
}
