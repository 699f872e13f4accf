use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::*;

use super::SymmetryContext;
use crate::*;

/// The kind of center an atom forms, which selects its local symmetry rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomCenter {
    /// Closed-shell `Cs` with four substituents.
    SaturatedCarbon4,
    /// Closed-shell `Os` with two substituents.
    SaturatedOxygen2,
    /// Closed-shell `Cdd`, the middle of C=C=C or C=C=O.
    CumulatedCarbon,
    /// `Cs` with one unpaired electron and three substituents.
    RadicalCarbon3,
    /// `Cs` with two unpaired electrons and two substituents.
    RadicalCarbon2,
    Other,
}

type Classifier = fn(&SymmetryContext, NodeIndex, &[EdgeIndex]) -> u32;

impl AtomCenter {
    pub fn classify(ctx: &SymmetryContext, node: NodeIndex) -> Self {
        let atom = ctx.graph()[node];
        let degree = ctx.graph().neighbors(node).count();
        match (ctx.tag(node), atom.radicals, degree) {
            (FgElement::Cs, 0, 4) => AtomCenter::SaturatedCarbon4,
            (FgElement::Os, 0, 2) => AtomCenter::SaturatedOxygen2,
            (FgElement::Cdd, 0, 2) => AtomCenter::CumulatedCarbon,
            (FgElement::Cs, 1, 3) => AtomCenter::RadicalCarbon3,
            (FgElement::Cs, 2, 2) => AtomCenter::RadicalCarbon2,
            _ => AtomCenter::Other,
        }
    }

    fn classifier(self) -> Classifier {
        match self {
            AtomCenter::SaturatedCarbon4 => four_substituents,
            AtomCenter::SaturatedOxygen2 => two_substituents,
            AtomCenter::CumulatedCarbon => two_substituents,
            AtomCenter::RadicalCarbon3 => three_substituents,
            AtomCenter::RadicalCarbon2 => two_substituents,
            AtomCenter::Other => no_symmetry,
        }
    }
}

/// Symmetry contributed by the substituents around one acyclic atom.
///
/// Ring atoms are scored as part of their ring structure and return 1 here.
pub fn atom_symmetry(ctx: &SymmetryContext, node: NodeIndex) -> u32 {
    if ctx.rings().node_in_cycle(node) {
        return 1;
    }
    let substituents = ctx.bonds_of(node);
    if substituents.len() < 2 {
        return 1;
    }
    let center = AtomCenter::classify(ctx, node);
    let sn = (center.classifier())(ctx, node, &substituents);
    trace!(node = node.index(), ?center, sn, "atom symmetry");
    sn
}

/// AAAA gives 12, AAAB gives 3, AABB gives 2, anything less symmetric 1.
/// The pairs are tested in a fixed order and the first branch that matches
/// decides.
fn four_substituents(ctx: &SymmetryContext, node: NodeIndex, a: &[EdgeIndex]) -> u32 {
    let same = |i: usize, j: usize| ctx.equivalence().substituents_equivalent(node, a[i], a[j]);

    if same(0, 1) {
        if same(0, 2) {
            if same(0, 3) {
                12
            } else {
                3
            }
        } else if same(0, 3) {
            3
        } else if same(2, 3) {
            2
        } else {
            1
        }
    } else if same(0, 2) {
        if same(0, 3) {
            3
        } else if same(1, 3) {
            2
        } else {
            1
        }
    } else if same(1, 2) {
        if same(0, 3) {
            2
        } else if same(1, 3) {
            3
        } else {
            1
        }
    } else {
        1
    }
}

/// AAA gives 6, AAB 2, ABC 1.
fn three_substituents(ctx: &SymmetryContext, node: NodeIndex, a: &[EdgeIndex]) -> u32 {
    let same = |i: usize, j: usize| ctx.equivalence().substituents_equivalent(node, a[i], a[j]);

    if same(0, 1) {
        if same(0, 2) {
            6
        } else {
            2
        }
    } else if same(0, 2) || same(1, 2) {
        2
    } else {
        1
    }
}

fn two_substituents(ctx: &SymmetryContext, node: NodeIndex, a: &[EdgeIndex]) -> u32 {
    if ctx.equivalence().substituents_equivalent(node, a[0], a[1]) {
        2
    } else {
        1
    }
}

fn no_symmetry(_: &SymmetryContext, _: NodeIndex, _: &[EdgeIndex]) -> u32 {
    1
}

/// Symmetry contributed by exchanging the two ends of an acyclic bond.
pub fn bond_symmetry(ctx: &SymmetryContext, edge: EdgeIndex) -> Result<u32, ChemGraphError> {
    let graph = ctx.graph();
    let (a, b) = match graph.edge_endpoints(edge) {
        Some((a, b)) if a != b => (a, b),
        Some(_) => {
            return Err(ChemGraphError::InvalidTopology {
                bond: edge.index(),
                neighbors: 1,
            })
        }
        None => {
            return Err(ChemGraphError::InvalidTopology {
                bond: edge.index(),
                neighbors: 0,
            })
        }
    };
    if ctx.rings().edge_in_cycle(edge) {
        return Ok(1);
    }

    if ctx.equivalence().ends_swappable(edge) && !is_optical_isomer(ctx, edge, a, b) {
        trace!(bond = edge.index(), "bond symmetry 2");
        Ok(2)
    } else {
        Ok(1)
    }
}

/// An -O-O- single bond between closed-shell oxygens: swapping its ends
/// yields the mirror image, not the same molecule.
pub fn is_optical_isomer(ctx: &SymmetryContext, edge: EdgeIndex, a: NodeIndex, b: NodeIndex) -> bool {
    let graph = ctx.graph();
    graph[edge] == Bond::Single
        && !graph[a].is_radical()
        && ctx.tag(a) == FgElement::Os
        && !graph[b].is_radical()
        && ctx.tag(b) == FgElement::Os
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::visit::EdgeRef;

    fn saturated(smiles: &str) -> MolecularGraph {
        let mut graph = parse_smiles(smiles).unwrap();
        add_missing_hydrogen(&mut graph).unwrap();
        graph
    }

    #[test]
    fn test_methane_center() {
        let methane = saturated("C");
        let ctx = SymmetryContext::new(&methane);
        let carbon = NodeIndex::new(0);
        assert_eq!(AtomCenter::classify(&ctx, carbon), AtomCenter::SaturatedCarbon4);
        assert_eq!(atom_symmetry(&ctx, carbon), 12);
    }

    #[test]
    fn test_four_substituent_patterns() {
        // isobutane center: three methyls and a hydrogen
        let isobutane = saturated("CC(C)C");
        let ctx = SymmetryContext::new(&isobutane);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 3);

        // propane center: two methyls and two hydrogens
        let propane = saturated("CCC");
        let ctx = SymmetryContext::new(&propane);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 2);

        // ethanol CH2: methyl, hydroxyl and two hydrogens
        let ethanol = saturated("CCO");
        let ctx = SymmetryContext::new(&ethanol);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 1);

        // 2-butanol center: all four different
        let butanol = saturated("CC(O)CC");
        let ctx = SymmetryContext::new(&butanol);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 1);
    }

    #[derive(Clone, Copy)]
    enum Group {
        H,
        Methyl,
        Hydroxyl,
    }

    /// A saturated carbon whose bonds come back from `bonds_of` in the order
    /// the groups are listed.
    fn center_with(groups: [Group; 4]) -> (MolecularGraph, NodeIndex) {
        let mut graph = MolecularGraph::default();
        let center = graph.add_node(Atom::saturated(ChemElement::C));
        let mut roots = Vec::new();
        for group in groups {
            let root = match group {
                Group::H => graph.add_node(Atom::saturated(ChemElement::H)),
                Group::Methyl => {
                    let carbon = graph.add_node(Atom::saturated(ChemElement::C));
                    for _ in 0..3 {
                        let h = graph.add_node(Atom::saturated(ChemElement::H));
                        graph.add_edge(carbon, h, Bond::Single);
                    }
                    carbon
                }
                Group::Hydroxyl => {
                    let oxygen = graph.add_node(Atom::saturated(ChemElement::O));
                    let h = graph.add_node(Atom::saturated(ChemElement::H));
                    graph.add_edge(oxygen, h, Bond::Single);
                    oxygen
                }
            };
            roots.push(root);
        }
        // a node's edge list is walked newest first
        for &root in roots.iter().rev() {
            graph.add_edge(center, root, Bond::Single);
        }
        let order: Vec<NodeIndex> = graph
            .edges(center)
            .map(|edge| other_end(&graph, edge.id(), center))
            .collect();
        assert_eq!(order, roots);
        (graph, center)
    }

    fn center_symmetry(groups: [Group; 4]) -> u32 {
        let (graph, center) = center_with(groups);
        let ctx = SymmetryContext::new(&graph);
        assert_eq!(AtomCenter::classify(&ctx, center), AtomCenter::SaturatedCarbon4);
        atom_symmetry(&ctx, center)
    }

    #[test]
    fn test_four_substituent_branches() {
        use Group::*;

        assert_eq!(center_symmetry([H, H, H, H]), 12);
        // first pair equal
        assert_eq!(center_symmetry([Methyl, Methyl, Methyl, H]), 3);
        assert_eq!(center_symmetry([Methyl, Methyl, H, Methyl]), 3);
        assert_eq!(center_symmetry([Methyl, Methyl, H, H]), 2);
        assert_eq!(center_symmetry([Methyl, Methyl, H, Hydroxyl]), 1);
        // first and third equal
        assert_eq!(center_symmetry([Methyl, H, Methyl, Methyl]), 3);
        assert_eq!(center_symmetry([Methyl, H, Methyl, H]), 2);
        assert_eq!(center_symmetry([Methyl, H, Methyl, Hydroxyl]), 1);
        // second and third equal
        assert_eq!(center_symmetry([Methyl, H, H, Methyl]), 2);
        assert_eq!(center_symmetry([Methyl, H, H, H]), 3);
        assert_eq!(center_symmetry([Methyl, H, H, Hydroxyl]), 1);
        // no pair among the first three
        assert_eq!(center_symmetry([Methyl, H, Hydroxyl, H]), 1);
    }

    #[test]
    fn test_ether_oxygen() {
        let ether = saturated("COC");
        let ctx = SymmetryContext::new(&ether);
        let oxygen = NodeIndex::new(1);
        assert_eq!(AtomCenter::classify(&ctx, oxygen), AtomCenter::SaturatedOxygen2);
        assert_eq!(atom_symmetry(&ctx, oxygen), 2);

        let methanol = saturated("CO");
        let ctx = SymmetryContext::new(&methanol);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 1);
    }

    #[test]
    fn test_radical_centers() {
        let methyl = saturated("[CH3]");
        let ctx = SymmetryContext::new(&methyl);
        assert_eq!(AtomCenter::classify(&ctx, NodeIndex::new(0)), AtomCenter::RadicalCarbon3);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(0)), 6);

        let ethyl = saturated("C[CH2]");
        let ctx = SymmetryContext::new(&ethyl);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 2);

        let methylene = saturated("[CH2]");
        let ctx = SymmetryContext::new(&methylene);
        assert_eq!(AtomCenter::classify(&ctx, NodeIndex::new(0)), AtomCenter::RadicalCarbon2);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(0)), 2);

        // a triplet carbon with three bonds is not one of the tabulated centers
        let vinyl = saturated("C=[CH]");
        let ctx = SymmetryContext::new(&vinyl);
        assert_eq!(AtomCenter::classify(&ctx, NodeIndex::new(1)), AtomCenter::Other);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 1);
    }

    #[test]
    fn test_leaf_has_no_symmetry() {
        let methane = saturated("C");
        let ctx = SymmetryContext::new(&methane);
        assert_eq!(atom_symmetry(&ctx, NodeIndex::new(1)), 1);
    }

    #[test]
    fn test_bond_symmetry() {
        let ethane = saturated("CC");
        let ctx = SymmetryContext::new(&ethane);
        let cc = ethane.find_edge(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        assert_eq!(bond_symmetry(&ctx, cc), Ok(2));

        let acetylene = saturated("C#C");
        let ctx = SymmetryContext::new(&acetylene);
        let cc = acetylene.find_edge(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        assert_eq!(bond_symmetry(&ctx, cc), Ok(2));

        let propane = saturated("CCC");
        let ctx = SymmetryContext::new(&propane);
        let cc = propane.find_edge(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        assert_eq!(bond_symmetry(&ctx, cc), Ok(1));
    }

    #[test]
    fn test_peroxide_veto() {
        let peroxide = saturated("COOC");
        let ctx = SymmetryContext::new(&peroxide);
        let oo = peroxide.find_edge(NodeIndex::new(1), NodeIndex::new(2)).unwrap();
        assert!(ctx.equivalence().ends_swappable(oo));
        assert!(is_optical_isomer(&ctx, oo, NodeIndex::new(1), NodeIndex::new(2)));
        assert_eq!(bond_symmetry(&ctx, oo), Ok(1));

        // the veto is about closed-shell oxygens only
        let radical = saturated("[O][O]");
        let ctx = SymmetryContext::new(&radical);
        let oo = radical.find_edge(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        assert_eq!(bond_symmetry(&ctx, oo), Ok(2));
    }

    #[test]
    fn test_self_loop_is_invalid_topology() {
        let mut graph = MolecularGraph::default();
        let carbon = graph.add_node(Atom::saturated(ChemElement::C));
        let loop_edge = graph.add_edge(carbon, carbon, Bond::Single);
        let ctx = SymmetryContext::new(&graph);
        assert_eq!(
            bond_symmetry(&ctx, loop_edge),
            Err(ChemGraphError::InvalidTopology {
                bond: loop_edge.index(),
                neighbors: 1
            })
        );
    }
}
