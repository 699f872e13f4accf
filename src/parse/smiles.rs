use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("branch start '(' at position {0} without a current atom")]
    BranchNoCurrentAtom(usize),
    #[error("branch end ')' at position {0} without a matching '('")]
    BranchEndNoStart(usize),
    #[error("ring closure '{0}' at position {1} without a current atom")]
    RingClosureNoCurrentAtom(char, usize),
    #[error("incomplete ring closure label after '%' at position {0}")]
    BadRingLabel(usize),
    #[error("ring {0} is opened but never closed")]
    UnclosedRing(u8),
    #[error("unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("unsupported atom `{symbol}` at position {position}")]
    UnknownAtom { position: usize, symbol: String },
}

struct SmilesBuilder {
    graph: MolecularGraph,
    current_atom: Option<NodeIndex>,
    bond_type: Bond,
    branch_stack: Vec<NodeIndex>,
    ring_map: BTreeMap<u8, (NodeIndex, Bond)>,
    /// Bracket atoms with the number of hydrogens written inside the bracket.
    bracket_atoms: Vec<(NodeIndex, u8)>,
}

impl SmilesBuilder {
    fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        let node = self.graph.add_node(atom);
        if let Some(prev_atom) = self.current_atom {
            self.graph.add_edge(prev_atom, node, self.bond_type);
        }
        self.bond_type = Bond::Single;
        self.current_atom = Some(node);
        node
    }

    fn ring_closure(&mut self, label: u8, c: char, position: usize) -> Result<(), SmilesError> {
        let current = self
            .current_atom
            .ok_or(SmilesError::RingClosureNoCurrentAtom(c, position))?;
        match self.ring_map.remove(&label) {
            Some((start_atom, opening_bond)) => {
                let bond = if self.bond_type != Bond::Single {
                    self.bond_type
                } else {
                    opening_bond
                };
                self.graph.add_edge(current, start_atom, bond);
            }
            None => {
                self.ring_map.insert(label, (current, self.bond_type));
            }
        }
        self.bond_type = Bond::Single;
        Ok(())
    }

    /// Unpaired electrons of bracket atoms are whatever valence is left after
    /// their bonds and written hydrogens. The hydrogens are appended after
    /// every heavy atom so that atom indices follow the string.
    fn finish(mut self) -> Result<MolecularGraph, SmilesError> {
        if let Some((&label, _)) = self.ring_map.iter().next() {
            return Err(SmilesError::UnclosedRing(label));
        }
        for (node, hydrogens) in std::mem::take(&mut self.bracket_atoms) {
            let used = bond_order_sum(&self.graph, node) + hydrogens as usize;
            let atom = &mut self.graph[node];
            atom.radicals = (atom.element.valence() as usize).saturating_sub(used) as u8;
            for _ in 0..hydrogens {
                let hydrogen = self.graph.add_node(Atom::saturated(ChemElement::H));
                self.graph.add_edge(node, hydrogen, Bond::Single);
            }
        }
        Ok(self.graph)
    }
}

/// Parses bracket content such as `CH2`, `OH` or `H` into an element and a
/// hydrogen count. The count may not exceed the element's valence.
fn parse_bracketed_smiles(content: &str, position: usize) -> Result<(ChemElement, u8), SmilesError> {
    let unknown = || SmilesError::UnknownAtom {
        position,
        symbol: content.to_string(),
    };
    let mut chars = content.chars();
    let element = chars
        .next()
        .and_then(|c| ChemElement::from_symbol(&c.to_string()))
        .ok_or_else(unknown)?;
    let rest = chars.as_str();
    let hydrogens = match rest.strip_prefix('H') {
        None if rest.is_empty() => 0,
        None => return Err(unknown()),
        Some("") => 1,
        Some(digits) => digits.parse::<u8>().map_err(|_| unknown())?,
    };
    if hydrogens > element.valence() {
        return Err(unknown());
    }
    Ok((element, hydrogens))
}

/// Parses a SMILES string over C, O and H into a molecular graph.
///
/// Organic-subset atoms (`C`, `O`) get their hydrogens later, from
/// [`add_missing_hydrogen`]. Bracket atoms (`[CH2]`, `[O]`) are exact: their
/// written hydrogens are added here and any valence left over becomes
/// unpaired electrons, so `[CH3]` is a methyl radical.
///
/// Supports bonds `-`, `=` and `#`, branches, ring closures `0`-`9` and
/// `%nn`, and `.` between fragments.
pub fn parse_smiles(smiles: &str) -> Result<MolecularGraph, SmilesError> {
    let mut builder = SmilesBuilder {
        graph: MolecularGraph::default(),
        current_atom: None,
        bond_type: Bond::Single,
        branch_stack: Vec::new(),
        ring_map: BTreeMap::new(),
        bracket_atoms: Vec::new(),
    };

    let chars: Vec<char> = smiles.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = builder.current_atom.ok_or(SmilesError::BranchNoCurrentAtom(i))?;
                builder.branch_stack.push(atom);
                i += 1;
            }
            ')' => {
                builder.current_atom = Some(builder.branch_stack.pop().ok_or(SmilesError::BranchEndNoStart(i))?);
                builder.bond_type = Bond::Single;
                i += 1;
            }
            '-' | '=' | '#' => {
                builder.bond_type = match c {
                    '=' => Bond::Double,
                    '#' => Bond::Triple,
                    _ => Bond::Single,
                };
                i += 1;
            }
            '.' => {
                builder.current_atom = None;
                builder.bond_type = Bond::Single;
                i += 1;
            }
            '%' => {
                let label = chars
                    .get(i + 1..i + 3)
                    .and_then(|digits| digits.iter().collect::<String>().parse::<u8>().ok())
                    .ok_or(SmilesError::BadRingLabel(i))?;
                builder.ring_closure(label, c, i)?;
                i += 3;
            }
            '0'..='9' => {
                let label = c as u8 - b'0';
                builder.ring_closure(label, c, i)?;
                i += 1;
            }
            '[' => {
                let Some(end_relative) = chars[i..].iter().position(|&x| x == ']') else {
                    return Err(SmilesError::UnclosedBracket(i));
                };
                let end = i + end_relative;
                let content: String = chars[i + 1..end].iter().collect();
                let (element, hydrogens) = parse_bracketed_smiles(&content, i)?;
                let node = builder.add_atom(Atom::saturated(element));
                builder.bracket_atoms.push((node, hydrogens));
                i = end + 1;
            }
            'C' | 'O' => {
                let element = if c == 'C' { ChemElement::C } else { ChemElement::O };
                builder.add_atom(Atom::saturated(element));
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            _ => {
                return Err(SmilesError::UnknownAtom {
                    position: i,
                    symbol: c.to_string(),
                })
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::visit::EdgeRef;

    #[test]
    fn test_parse_ethanol() {
        let ethanol = parse_smiles("CCO").unwrap();
        assert_eq!(ethanol.node_count(), 3);
        assert_eq!(ethanol.edge_count(), 2);
        assert_eq!(ethanol[NodeIndex::new(2)], Atom::saturated(ChemElement::O));
        assert!(ethanol.edge_weights().all(|bond| *bond == Bond::Single));
    }

    #[test]
    fn test_parse_cyclohexane() {
        let cyclohexane = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(cyclohexane.node_count(), 6);
        assert_eq!(cyclohexane.edge_count(), 6);
        for node in cyclohexane.node_indices() {
            assert_eq!(cyclohexane.neighbors(node).count(), 2);
        }
    }

    #[test]
    fn test_parse_kekule_benzene() {
        let benzene = parse_smiles("C1=CC=CC=C1").unwrap();
        let doubles = benzene.edge_weights().filter(|bond| **bond == Bond::Double).count();
        assert_eq!(benzene.edge_count(), 6);
        assert_eq!(doubles, 3);
    }

    #[test]
    fn test_parse_isobutane() {
        let isobutane = parse_smiles("CC(C)C").unwrap();
        assert_eq!(isobutane.neighbors(NodeIndex::new(1)).count(), 3);
        let branch = isobutane.find_edge(NodeIndex::new(1), NodeIndex::new(2));
        let main = isobutane.find_edge(NodeIndex::new(1), NodeIndex::new(3));
        assert!(branch.is_some() && main.is_some());
    }

    #[test]
    fn test_bracket_radicals() {
        let methyl = parse_smiles("[CH3]").unwrap();
        assert_eq!(methyl.node_count(), 4);
        assert_eq!(methyl[NodeIndex::new(0)].radicals, 1);

        let ethyl = parse_smiles("C[CH2]").unwrap();
        assert_eq!(ethyl[NodeIndex::new(0)].radicals, 0);
        assert_eq!(ethyl[NodeIndex::new(1)].radicals, 1);
        // hydrogens come after the heavy atoms
        assert!(ethyl[NodeIndex::new(2)].is_hydrogen());

        let oxygen = parse_smiles("[O]").unwrap();
        assert_eq!(oxygen[NodeIndex::new(0)].radicals, 2);

        let hydroxyl = parse_smiles("[OH]").unwrap();
        assert_eq!(hydroxyl[NodeIndex::new(0)].radicals, 1);
    }

    #[test]
    fn test_ring_closure_bond() {
        let graph = parse_smiles("C=1CC1").unwrap();
        let closing = graph.find_edge(NodeIndex::new(2), NodeIndex::new(0)).unwrap();
        assert_eq!(graph[closing], Bond::Double);

        let graph = parse_smiles("C%10CC%10").unwrap();
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_fragments() {
        let graph = parse_smiles("C.O").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_triple_bond() {
        let graph = parse_smiles("C#C").unwrap();
        let edge = graph.edge_references().next().unwrap();
        assert_eq!(*edge.weight(), Bond::Triple);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_smiles("(C)").unwrap_err(), SmilesError::BranchNoCurrentAtom(0));
        assert_eq!(parse_smiles("C)").unwrap_err(), SmilesError::BranchEndNoStart(1));
        assert_eq!(parse_smiles("C1CC").unwrap_err(), SmilesError::UnclosedRing(1));
        assert_eq!(parse_smiles("C[CH2").unwrap_err(), SmilesError::UnclosedBracket(1));
        assert!(matches!(parse_smiles("CN"), Err(SmilesError::UnknownAtom { position: 1, .. })));
        assert!(matches!(parse_smiles("[Cl]"), Err(SmilesError::UnknownAtom { .. })));
        assert!(matches!(parse_smiles("C%1"), Err(SmilesError::BadRingLabel(1))));
    }

    #[test]
    fn test_bracket_hydrogen_bounds() {
        assert!(matches!(parse_smiles("C[CH255]"), Err(SmilesError::UnknownAtom { position: 1, .. })));
        assert!(matches!(parse_smiles("[CH5]"), Err(SmilesError::UnknownAtom { position: 0, .. })));
        assert!(matches!(parse_smiles("[OH3]"), Err(SmilesError::UnknownAtom { .. })));
        assert!(matches!(parse_smiles("[CH999]"), Err(SmilesError::UnknownAtom { .. })));

        // written hydrogens beyond what the bonds leave are not radicals
        let graph = parse_smiles("C=C=[CH4]").unwrap();
        assert_eq!(graph[NodeIndex::new(2)].radicals, 0);
    }
}
