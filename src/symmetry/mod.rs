//! Rotational symmetry numbers of molecular graphs.
//!
//! The overall number is a product of independent factors:
//! - every atom outside a ring contributes by its bonding pattern,
//! - every bond outside a ring contributes 2 when its ends can be exchanged,
//! - every chain of cumulated double bonds may contribute an axis factor,
//! - every ring structure contributes by its largest equivalence class.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::*;

use crate::*;

mod local;
pub use local::*;

mod axis;
pub use axis::*;

mod cyclic;
pub use cyclic::*;

/// Everything the classifiers need to know about one graph.
///
/// Ring membership is identified when the context is built, so no local rule
/// can ever run against a graph whose rings are unknown.
pub struct SymmetryContext<'g> {
    graph: &'g MolecularGraph,
    rings: RingInfo,
    equivalence: Equivalence,
    tags: Vec<FgElement>,
}

impl<'g> SymmetryContext<'g> {
    pub fn new(graph: &'g MolecularGraph) -> Self {
        let rings = RingInfo::identify(graph);
        let tags = graph.node_indices().map(|node| FgElement::of(graph, node)).collect();
        Self {
            graph,
            rings,
            equivalence: Equivalence::new(graph),
            tags,
        }
    }

    pub fn graph(&self) -> &'g MolecularGraph {
        self.graph
    }

    pub fn rings(&self) -> &RingInfo {
        &self.rings
    }

    pub fn equivalence(&self) -> &Equivalence {
        &self.equivalence
    }

    pub fn tag(&self, node: NodeIndex) -> FgElement {
        self.tags[node.index()]
    }

    pub fn bonds_of(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.graph.edges(node).map(|edge| edge.id()).collect()
    }
}

/// The symmetry number of a graph, with the partial products it is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryReport {
    pub number: u32,
    pub atoms: u32,
    pub bonds: u32,
    pub axes: u32,
    pub rings: u32,
    pub symmetry_axes: Vec<SymmetryAxis>,
}

/// Multiplies a partial symmetry number by one more factor, failing instead of
/// wrapping when the result no longer fits.
pub fn combine_symmetry(product: u32, factor: u32, part: &str) -> Result<u32, ChemGraphError> {
    product
        .checked_mul(factor)
        .ok_or_else(|| ChemGraphError::InvalidChemGraph(format!("{part} symmetry number overflows u32")))
}

/// Computes the overall symmetry number of a hydrogen-saturated graph.
pub fn symmetry_number(graph: &MolecularGraph) -> Result<SymmetryReport, ChemGraphError> {
    let ctx = SymmetryContext::new(graph);

    let mut atoms = 1;
    for node in graph.node_indices() {
        if !ctx.rings().node_in_cycle(node) {
            atoms = combine_symmetry(atoms, atom_symmetry(&ctx, node), "atom")?;
        }
    }

    let mut bonds = 1;
    for edge in graph.edge_indices() {
        if !ctx.rings().edge_in_cycle(edge) {
            bonds = combine_symmetry(bonds, bond_symmetry(&ctx, edge)?, "bond")?;
        }
    }

    let (axes, symmetry_axes) = axis_symmetry(&ctx)?;

    let rings = if ctx.rings().is_acyclic() {
        1
    } else {
        cyclic_symmetry(&ctx)?
    };

    let number = [bonds, axes, rings]
        .into_iter()
        .try_fold(atoms, |product, factor| combine_symmetry(product, factor, "overall"))?;
    debug!(atoms, bonds, axes, rings, number, "symmetry number");
    Ok(SymmetryReport {
        number,
        atoms,
        bonds,
        axes,
        rings,
        symmetry_axes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saturated(smiles: &str) -> MolecularGraph {
        let mut graph = parse_smiles(smiles).unwrap();
        add_missing_hydrogen(&mut graph).unwrap();
        graph
    }

    fn sigma(smiles: &str) -> u32 {
        symmetry_number(&saturated(smiles)).unwrap().number
    }

    #[test]
    fn test_small_molecules() {
        assert_eq!(sigma("C"), 12); // methane
        assert_eq!(sigma("O"), 2); // water
        assert_eq!(sigma("CC"), 18); // ethane, 3 x 3 x 2
        assert_eq!(sigma("CCC"), 18); // propane, 3 x 3 x 2
        assert_eq!(sigma("COC"), 18); // dimethyl ether
        assert_eq!(sigma("CC(C)(C)C"), 972); // neopentane, 12 x 3^4
        assert_eq!(sigma("C=C"), 4); // ethylene
        assert_eq!(sigma("C=O"), 2); // formaldehyde
        assert_eq!(sigma("O=C=O"), 2); // carbon dioxide
    }

    #[test]
    fn test_allene_and_ketene() {
        let report = symmetry_number(&saturated("C=C=C")).unwrap();
        assert_eq!(report.atoms, 2);
        assert_eq!(report.axes, 2);
        assert_eq!(report.number, 4);
        assert_eq!(report.symmetry_axes.len(), 1);
        assert_eq!(report.symmetry_axes[0].edges.len(), 2);

        assert_eq!(sigma("C=C=O"), 2);
    }

    #[test]
    fn test_radicals() {
        assert_eq!(sigma("[CH3]"), 6); // methyl
        assert_eq!(sigma("C[CH2]"), 6); // ethyl: 3 x 2
        assert_eq!(sigma("[CH2]"), 2); // methylene
        assert_eq!(sigma("C[CH]C"), 18); // isopropyl: 3 x 3 x 2
    }

    #[test]
    fn test_peroxide_has_no_bond_factor() {
        let report = symmetry_number(&saturated("OO")).unwrap();
        assert_eq!(report.bonds, 1);
        assert_eq!(report.number, 1);
    }

    #[test]
    fn test_rings() {
        assert_eq!(sigma("C1CC1"), 6); // cyclopropane
        assert_eq!(sigma("C1CCCCC1"), 12); // cyclohexane
        assert_eq!(sigma("CC1CC1"), 6); // methylcyclopropane: 3 x 2
        assert_eq!(sigma("C1CC12CC2"), 4); // spiropentane
        assert_eq!(sigma("C1CC1C1CC1"), 8); // bicyclopropyl: 2 x 2 x 2
        assert_eq!(sigma("C1=CC=CC=C1"), 6); // Kekule benzene
    }

    #[test]
    fn test_positive_and_idempotent() {
        for smiles in ["C", "CCO", "C=CC=C", "OC1CC(O)C1", "C1CC2CC12", "[CH2]C=C", "C#CC"] {
            let graph = saturated(smiles);
            let first = symmetry_number(&graph).unwrap();
            let second = symmetry_number(&graph).unwrap();
            assert!(first.number >= 1, "{smiles} gave {}", first.number);
            assert_eq!(first, second, "{smiles} is not idempotent");
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        // every inner carbon of a tridecane chain carries two methyls: 24 methyl
        // groups contribute 3 each
        let smiles = format!("C{}C", "C(C)(C)".repeat(11));
        let graph = saturated(&smiles);
        assert!(matches!(
            symmetry_number(&graph),
            Err(ChemGraphError::InvalidChemGraph(_))
        ));

        assert_eq!(combine_symmetry(u32::MAX, 1, "atom"), Ok(u32::MAX));
        assert!(combine_symmetry(u32::MAX, 2, "atom").is_err());
    }

    #[test]
    fn test_graph_untouched() {
        let graph = saturated("CC1(C)CC(=C=C)C1");
        let snapshot = |g: &MolecularGraph| {
            let nodes: Vec<Atom> = g.node_indices().map(|n| g[n]).collect();
            let edges: Vec<_> = g
                .edge_references()
                .map(|e| (e.source(), e.target(), *e.weight()))
                .collect();
            (nodes, edges)
        };
        let before = snapshot(&graph);
        symmetry_number(&graph).unwrap();
        assert_eq!(before, snapshot(&graph));
    }
}
