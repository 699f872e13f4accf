use std::path::Path;

use anyhow::Context;
use petgraph::algo::is_isomorphic_subgraph_matching;
use petgraph::graph::UnGraph;
use tracing::*;

use crate::*;

/// What a pattern atom accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomPattern {
    Element(ChemElement),
    Tag(FgElement),
    /// `R`: any atom.
    Any,
    /// `R!H`: any atom except hydrogen.
    AnyHeavy,
}

impl AtomPattern {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "R" => Some(AtomPattern::Any),
            "R!H" => Some(AtomPattern::AnyHeavy),
            _ => ChemElement::from_symbol(symbol)
                .map(AtomPattern::Element)
                .or_else(|| FgElement::from_symbol(symbol).map(AtomPattern::Tag)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternAtom {
    pub pattern: AtomPattern,
    /// `None` accepts any radical count.
    pub radicals: Option<u8>,
}

impl PatternAtom {
    pub fn matches(&self, atom: &Atom, tag: FgElement) -> bool {
        let kind = match self.pattern {
            AtomPattern::Element(element) => atom.element == element,
            AtomPattern::Tag(expected) => tag == expected,
            AtomPattern::Any => true,
            AtomPattern::AnyHeavy => !atom.is_hydrogen(),
        };
        kind && self.radicals.map_or(true, |radicals| radicals == atom.radicals)
    }
}

/// A named structural pattern.
#[derive(Debug, Clone)]
pub struct FunctionalGroup {
    name: String,
    graph: UnGraph<PatternAtom, Bond>,
}

impl FunctionalGroup {
    pub fn new(name: impl Into<String>, graph: UnGraph<PatternAtom, Bond>) -> Self {
        Self {
            name: name.into(),
            graph,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parses the pattern from adjacency-list lines.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, AdjListError> {
        let entries = parse_adjacency_entries(text)?;
        let graph = build_graph(&entries, |position, entry| {
            let pattern = AtomPattern::from_symbol(&entry.symbol).ok_or_else(|| ChemGraphError::InvalidElementType {
                node: position,
                found: entry.symbol.clone(),
            })?;
            Ok(PatternAtom {
                pattern,
                radicals: entry.radicals,
            })
        })?;
        Ok(Self::new(name, graph))
    }

    /// The pattern occurs as an induced subgraph of `graph`, with atom tags
    /// taken from the bonds `graph` actually has.
    pub fn occurs_in(&self, graph: &MolecularGraph) -> bool {
        if self.graph.node_count() > graph.node_count() {
            return false;
        }
        let tagged = graph.map(|node, atom| (*atom, FgElement::of(graph, node)), |_, bond| *bond);
        is_isomorphic_subgraph_matching(
            &self.graph,
            &tagged,
            |pattern: &PatternAtom, (atom, tag): &(Atom, FgElement)| pattern.matches(atom, *tag),
            |b0: &Bond, b1: &Bond| b0 == b1,
        )
    }
}

/// Structures a species may never contain. Loaded once and passed by
/// reference wherever graphs are validated.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenStructureSet {
    groups: Vec<FunctionalGroup>,
}

impl ForbiddenStructureSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(groups: Vec<FunctionalGroup>) -> Self {
        Self { groups }
    }

    /// Parses named pattern blocks separated by blank lines.
    pub fn parse(text: &str) -> Result<Self, AdjListError> {
        let groups = named_blocks(text)
            .into_iter()
            .map(|(name, body)| FunctionalGroup::parse(name, &body))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(groups))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read forbidden structures from {}", path.display()))?;
        let set = Self::parse(&text).with_context(|| format!("While parsing {}", path.display()))?;
        info!(count = set.len(), path = %path.display(), "loaded forbidden structures");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[FunctionalGroup] {
        &self.groups
    }

    /// Name of the first group found in `graph`.
    pub fn find_match(&self, graph: &MolecularGraph) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.occurs_in(graph))
            .map(|group| group.name())
    }
}
