use thiserror::Error;

/// Reasons a graph cannot become (or be analysed as) a ChemGraph.
///
/// None of these are recoverable for the graph in question: the computation
/// is deterministic, so the same input always fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChemGraphError {
    #[error("bond {bond} has {neighbors} distinct neighbor(s), expected 2")]
    InvalidTopology { bond: usize, neighbors: usize },
    #[error("invalid chem graph: node {node} holds `{found}`, which is not an atom")]
    InvalidElementType { node: usize, found: String },
    #[error("graph contains the forbidden structure `{name}`")]
    ForbiddenStructure { name: String },
    #[error("{what} count {count} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },
    #[error("atom {node} ({element}) uses {used} bonding electrons but has a valence of {valence}")]
    Overbonded {
        node: usize,
        element: String,
        used: usize,
        valence: usize,
    },
    #[error("invalid chem graph: {0}")]
    InvalidChemGraph(String),
}
