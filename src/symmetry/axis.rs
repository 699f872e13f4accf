use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::*;

use super::{combine_symmetry, SymmetryContext};
use crate::*;

/// One chain of cumulated double bonds and the two atoms that end it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryAxis {
    pub edges: Vec<EdgeIndex>,
    pub termini: (NodeIndex, NodeIndex),
}

/// Product of the twofold factors of every double-bond axis in the graph,
/// along with the axes that were walked.
///
/// A radical at either end of an axis stops the scan: the product so far is
/// returned and later axes are neither walked nor scored.
pub fn axis_symmetry(ctx: &SymmetryContext) -> Result<(u32, Vec<SymmetryAxis>), ChemGraphError> {
    let graph = ctx.graph();
    let mut claimed = HashSet::new();
    let mut axes = Vec::new();
    let mut product = 1;

    for edge in graph.edge_indices() {
        if graph[edge] != Bond::Double || claimed.contains(&edge) {
            continue;
        }
        let Some((a, b)) = graph.edge_endpoints(edge) else {
            continue;
        };

        let mut edges = vec![edge];
        claimed.insert(edge);
        let start = walk_cumulated(ctx, a, edge, &mut edges, &mut claimed);
        let end = walk_cumulated(ctx, b, edge, &mut edges, &mut claimed);
        axes.push(SymmetryAxis {
            edges,
            termini: (start, end),
        });

        if graph[start].is_radical() || graph[end].is_radical() {
            // FIXME: a single radical terminus abandons every axis after it,
            // even ones that are independent of this one.
            debug!(axis = axes.len(), "radical axis terminus ends the axis scan");
            return Ok((product, axes));
        }

        let factor = match (is_leaf(graph, start), is_leaf(graph, end)) {
            (false, false) if symmetric_terminus(ctx, start) && symmetric_terminus(ctx, end) => 2,
            (false, true) if symmetric_terminus(ctx, start) => 2,
            (true, false) if symmetric_terminus(ctx, end) => 2,
            _ => 1,
        };
        trace!(axis = axes.len(), factor, "axis symmetry");
        product = combine_symmetry(product, factor, "axis")?;
    }

    Ok((product, axes))
}

/// Follows the chain through `Cdd` centers, starting at `node` which was
/// entered through `via`. Returns the first atom that is not a `Cdd` center.
fn walk_cumulated(
    ctx: &SymmetryContext,
    mut node: NodeIndex,
    mut via: EdgeIndex,
    edges: &mut Vec<EdgeIndex>,
    claimed: &mut HashSet<EdgeIndex>,
) -> NodeIndex {
    let graph = ctx.graph();
    while ctx.tag(node) == FgElement::Cdd {
        let next = graph
            .edges(node)
            .find(|e| e.id() != via && *e.weight() == Bond::Double && !claimed.contains(&e.id()));
        let Some(next) = next else {
            break;
        };
        via = next.id();
        claimed.insert(via);
        edges.push(via);
        node = other_end(graph, via, node);
    }
    node
}

/// A terminus whose two substituents outside the axis can be exchanged.
fn symmetric_terminus(ctx: &SymmetryContext, node: NodeIndex) -> bool {
    let graph = ctx.graph();
    let substituents: Vec<EdgeIndex> = graph
        .edges(node)
        .filter(|e| *e.weight() != Bond::Double)
        .map(|e| e.id())
        .collect();
    match substituents.as_slice() {
        [e, f] => ctx.equivalence().substituents_equivalent(node, *e, *f),
        _ => false,
    }
}
