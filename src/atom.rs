use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::MolecularGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChemElement {
    C,
    H,
    O,
}

impl ChemElement {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "C" => Some(ChemElement::C),
            "H" => Some(ChemElement::H),
            "O" => Some(ChemElement::O),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ChemElement::C => "C",
            ChemElement::H => "H",
            ChemElement::O => "O",
        }
    }

    /// Number of bonding electrons the neutral, closed-shell atom uses.
    pub fn valence(&self) -> u8 {
        match self {
            ChemElement::C => 4,
            ChemElement::H => 1,
            ChemElement::O => 2,
        }
    }

    pub fn atomic_number(&self) -> u8 {
        match self {
            ChemElement::C => 6,
            ChemElement::H => 1,
            ChemElement::O => 8,
        }
    }

    /// Standard atomic weight in g/mol.
    pub fn weight(&self) -> f64 {
        match self {
            ChemElement::C => 12.011,
            ChemElement::H => 1.008,
            ChemElement::O => 15.999,
        }
    }
}

impl Display for ChemElement {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

/// An atom placed in a molecular graph: its element and its number of
/// unpaired (radical) electrons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub element: ChemElement,
    pub radicals: u8,
}

impl Atom {
    pub fn new(element: ChemElement, radicals: u8) -> Self {
        Self { element, radicals }
    }

    pub fn saturated(element: ChemElement) -> Self {
        Self::new(element, 0)
    }

    pub fn is_radical(&self) -> bool {
        self.radicals > 0
    }

    pub fn is_carbon(&self) -> bool {
        self.element == ChemElement::C
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == ChemElement::H
    }

    pub fn is_oxygen(&self) -> bool {
        self.element == ChemElement::O
    }
}

impl From<ChemElement> for Atom {
    fn from(element: ChemElement) -> Self {
        Atom::saturated(element)
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}{}", self.element, ".".repeat(self.radicals as usize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bond {
    Single,
    Double,
    Triple,
}

impl Bond {
    pub fn order(&self) -> u8 {
        match self {
            Bond::Single => 1,
            Bond::Double => 2,
            Bond::Triple => 3,
        }
    }

    /// Adjacency-list symbol: `S`, `D` or `T`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "S" => Some(Bond::Single),
            "D" => Some(Bond::Double),
            "T" => Some(Bond::Triple),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Bond::Single => "S",
            Bond::Double => "D",
            Bond::Triple => "T",
        }
    }
}

/// Functional-group element: an atom type refined by the bonds it makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FgElement {
    /// Carbon with single bonds only.
    Cs,
    /// Carbon with one double bond to carbon.
    Cd,
    /// Carbon with two double bonds (allene or ketene center).
    Cdd,
    /// Carbon with a triple bond.
    Ct,
    /// Carbonyl carbon.
    CO,
    Os,
    Od,
    H,
}

impl FgElement {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "Cs" => Some(FgElement::Cs),
            "Cd" => Some(FgElement::Cd),
            "Cdd" => Some(FgElement::Cdd),
            "Ct" => Some(FgElement::Ct),
            "CO" => Some(FgElement::CO),
            "Os" => Some(FgElement::Os),
            "Od" => Some(FgElement::Od),
            _ => None,
        }
    }

    /// Tag the atom at `node` from its element and the bonds it makes.
    pub fn of(graph: &MolecularGraph, node: NodeIndex) -> Self {
        let mut doubles = 0;
        let mut double_to_oxygen = false;
        let mut triple = false;
        for edge in graph.edges(node) {
            match edge.weight() {
                Bond::Double => {
                    doubles += 1;
                    if graph[other_end(graph, edge.id(), node)].is_oxygen() {
                        double_to_oxygen = true;
                    }
                }
                Bond::Triple => triple = true,
                Bond::Single => {}
            }
        }

        match graph[node].element {
            ChemElement::H => FgElement::H,
            ChemElement::O if doubles > 0 => FgElement::Od,
            ChemElement::O => FgElement::Os,
            ChemElement::C if triple => FgElement::Ct,
            ChemElement::C if doubles >= 2 => FgElement::Cdd,
            ChemElement::C if double_to_oxygen => FgElement::CO,
            ChemElement::C if doubles == 1 => FgElement::Cd,
            ChemElement::C => FgElement::Cs,
        }
    }
}

impl Display for FgElement {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{:?}", self)
    }
}

/// The endpoint of `edge` that is not `node`. A self-loop returns `node`.
pub fn other_end(graph: &MolecularGraph, edge: EdgeIndex, node: NodeIndex) -> NodeIndex {
    match graph.edge_endpoints(edge) {
        Some((a, b)) if a == node => b,
        Some((a, _)) => a,
        None => node,
    }
}

pub fn is_leaf(graph: &MolecularGraph, node: NodeIndex) -> bool {
    graph.neighbors(node).count() == 1
}

/// Sum of the orders of all bonds touching `node`.
pub fn bond_order_sum(graph: &MolecularGraph, node: NodeIndex) -> usize {
    graph.edges(node).map(|edge| edge.weight().order() as usize).sum()
}
