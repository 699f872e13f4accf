use petgraph::algo::{connected_components, is_isomorphic_matching};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::*;

use crate::*;

/// Upper bounds a species must respect to be accepted by [`ChemGraph::make`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_radicals: usize,
    pub max_oxygens: usize,
    pub max_carbons: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_radicals: 3,
            max_oxygens: 6,
            max_carbons: 8,
        }
    }
}

/// A validated, hydrogen-saturated molecular graph with its derived
/// properties. Built once by [`ChemGraph::make`] and never changed.
#[derive(Debug, Clone)]
pub struct ChemGraph {
    graph: MolecularGraph,
    formula: String,
    symmetry: SymmetryReport,
    internal_rotors: usize,
}

impl ChemGraph {
    /// Validates `graph`, fills every open valence with hydrogen and computes
    /// the formula, symmetry number and internal rotor count.
    pub fn make(
        mut graph: MolecularGraph,
        forbidden: &ForbiddenStructureSet,
        limits: &Limits,
    ) -> Result<Self, ChemGraphError> {
        if graph.node_count() == 0 {
            return Err(ChemGraphError::InvalidChemGraph("the graph has no atoms".to_string()));
        }
        if let Some(name) = forbidden.find_match(&graph) {
            return Err(ChemGraphError::ForbiddenStructure { name: name.to_string() });
        }
        check_limit("radical", radical_count(&graph), limits.max_radicals)?;
        check_limit("oxygen", count_atoms(&graph, ChemElement::O), limits.max_oxygens)?;

        let added = add_missing_hydrogen(&mut graph)?;
        debug!(added, "saturated with hydrogen");

        check_representation(&graph, limits)?;

        let formula = chemical_formula(&graph);
        let symmetry = symmetry_number(&graph)?;
        let internal_rotors = rotor_bonds(&graph).len();
        info!(
            formula = %formula,
            symmetry = symmetry.number,
            internal_rotors,
            "made chem graph"
        );

        Ok(Self {
            graph,
            formula,
            symmetry,
            internal_rotors,
        })
    }

    pub fn graph(&self) -> &MolecularGraph {
        &self.graph
    }

    pub fn symmetry_number(&self) -> u32 {
        self.symmetry.number
    }

    pub fn symmetry(&self) -> &SymmetryReport {
        &self.symmetry
    }

    pub fn symmetry_axes(&self) -> &[SymmetryAxis] {
        &self.symmetry.symmetry_axes
    }

    pub fn chemical_formula(&self) -> &str {
        &self.formula
    }

    pub fn molecular_weight(&self) -> f64 {
        self.graph
            .node_indices()
            .map(|node| self.graph[node].element.weight())
            .sum()
    }

    pub fn atom_number(&self) -> usize {
        self.graph.node_count()
    }

    pub fn carbon_number(&self) -> usize {
        count_atoms(&self.graph, ChemElement::C)
    }

    pub fn hydrogen_number(&self) -> usize {
        count_atoms(&self.graph, ChemElement::H)
    }

    pub fn oxygen_number(&self) -> usize {
        count_atoms(&self.graph, ChemElement::O)
    }

    pub fn radical_number(&self) -> usize {
        radical_count(&self.graph)
    }

    pub fn radical_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&node| self.graph[node].is_radical())
            .collect()
    }

    pub fn is_radical(&self) -> bool {
        self.radical_number() > 0
    }

    pub fn is_acyclic(&self) -> bool {
        RingInfo::identify(&self.graph).is_acyclic()
    }

    /// Linear species: diatomics, cumulated chains such as O=C=O, and chains
    /// where every two-connected atom sits between a single and a triple bond.
    pub fn is_linear(&self) -> bool {
        let graph = &self.graph;
        match graph.node_count() {
            1 => return false,
            _ if !self.is_acyclic() => return false,
            2 => return true,
            _ => {}
        }

        if graph.edge_weights().all(|bond| *bond == Bond::Double) {
            return true;
        }

        graph.node_indices().all(|node| {
            let bonds: Vec<Bond> = graph.edges(node).map(|edge| *edge.weight()).collect();
            matches!(
                bonds.as_slice(),
                [_] | [Bond::Single, Bond::Triple] | [Bond::Triple, Bond::Single]
            )
        })
    }

    /// Single bonds outside rings whose two ends both carry further atoms.
    pub fn internal_rotors(&self) -> usize {
        self.internal_rotors
    }

    /// Same formula and an isomorphism between the graphs that respects
    /// atoms and bond orders.
    pub fn is_equivalent(&self, other: &ChemGraph) -> bool {
        self.formula == other.formula
            && is_isomorphic_matching(&self.graph, &other.graph, |a, b| a == b, |a, b| a == b)
    }

    /// Replaces every unpaired electron with a hydrogen atom and rebuilds the
    /// result through [`ChemGraph::make`].
    pub fn saturate(&self, forbidden: &ForbiddenStructureSet, limits: &Limits) -> Result<ChemGraph, ChemGraphError> {
        let mut graph = self.graph.clone();
        for node in self.radical_nodes() {
            let radicals = graph[node].radicals;
            graph[node].radicals = 0;
            for _ in 0..radicals {
                let hydrogen = graph.add_node(Atom::saturated(ChemElement::H));
                graph.add_edge(node, hydrogen, Bond::Single);
            }
        }
        ChemGraph::make(graph, forbidden, limits)
    }

    /// Estimates thermo data with `estimator` and removes the rotational
    /// symmetry contribution from the entropy.
    pub fn generate_thermo_data(&self, estimator: &impl ThermoEstimator) -> anyhow::Result<ThermoData> {
        let raw = estimator.estimate(self)?;
        Ok(raw.with_symmetry_correction(self.symmetry_number()))
    }
}

fn check_limit(what: &'static str, count: usize, limit: usize) -> Result<(), ChemGraphError> {
    if count > limit {
        Err(ChemGraphError::LimitExceeded { what, count, limit })
    } else {
        Ok(())
    }
}

fn check_representation(graph: &MolecularGraph, limits: &Limits) -> Result<(), ChemGraphError> {
    for edge in graph.edge_references() {
        if edge.source() == edge.target() {
            return Err(ChemGraphError::InvalidTopology {
                bond: edge.id().index(),
                neighbors: 1,
            });
        }
    }
    let components = connected_components(graph);
    if components != 1 {
        return Err(ChemGraphError::InvalidChemGraph(format!(
            "the graph has {components} disconnected fragments"
        )));
    }
    check_limit("radical", radical_count(graph), limits.max_radicals)?;
    check_limit("oxygen", count_atoms(graph, ChemElement::O), limits.max_oxygens)?;
    check_limit("carbon", count_atoms(graph, ChemElement::C), limits.max_carbons)?;
    Ok(())
}

fn count_atoms(graph: &MolecularGraph, element: ChemElement) -> usize {
    graph.node_weights().filter(|atom| atom.element == element).count()
}

fn radical_count(graph: &MolecularGraph) -> usize {
    graph.node_weights().map(|atom| atom.radicals as usize).sum()
}

/// Attaches hydrogens to every heavy atom until its valence is used up.
/// Returns the number of hydrogens added.
pub fn add_missing_hydrogen(graph: &mut MolecularGraph) -> Result<usize, ChemGraphError> {
    let mut missing: Vec<(NodeIndex, usize)> = Vec::new();
    for node in graph.node_indices() {
        let atom = graph[node];
        let used = bond_order_sum(graph, node) + atom.radicals as usize;
        let valence = atom.element.valence() as usize;
        if used > valence {
            return Err(ChemGraphError::Overbonded {
                node: node.index(),
                element: atom.element.to_string(),
                used,
                valence,
            });
        }
        if !atom.is_hydrogen() && used < valence {
            missing.push((node, valence - used));
        }
    }

    let mut added = 0;
    for (node, count) in missing {
        for _ in 0..count {
            let hydrogen = graph.add_node(Atom::saturated(ChemElement::H));
            graph.add_edge(node, hydrogen, Bond::Single);
            added += 1;
        }
    }
    Ok(added)
}

/// Every atom uses exactly its valence in bonds and unpaired electrons.
pub fn valency_ok(graph: &MolecularGraph) -> bool {
    graph.node_indices().all(|node| {
        let atom = graph[node];
        bond_order_sum(graph, node) + atom.radicals as usize == atom.element.valence() as usize
    })
}

/// Formula in C, H, O order, followed by one `.` per unpaired electron,
/// e.g. `C2H5.` for ethyl.
pub fn chemical_formula(graph: &MolecularGraph) -> String {
    let mut formula = String::new();
    for element in [ChemElement::C, ChemElement::H, ChemElement::O] {
        match count_atoms(graph, element) {
            0 => {}
            1 => formula.push_str(element.symbol()),
            n => formula.push_str(&format!("{}{}", element.symbol(), n)),
        }
    }
    formula.push_str(&".".repeat(radical_count(graph)));
    formula
}

/// Bonds along which the two halves of the molecule can rotate.
pub fn rotor_bonds(graph: &MolecularGraph) -> Vec<EdgeIndex> {
    let rings = RingInfo::identify(graph);
    graph
        .edge_references()
        .filter(|edge| *edge.weight() == Bond::Single && !rings.edge_in_cycle(edge.id()))
        .filter(|edge| !is_leaf(graph, edge.source()) && !is_leaf(graph, edge.target()))
        .map(|edge| edge.id())
        .collect()
}
