use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Write;
use std::path::Path;

use petgraph::visit::EdgeRef;
use tracing::*;

use crate::*;

/// Graphviz rendering of a molecular graph. Atoms are labelled with their
/// element and radical dots, ring atoms get a double outline and multiple
/// bonds are drawn as parallel edges.
pub struct MoleculeDot<'g>(pub &'g MolecularGraph);

impl Display for MoleculeDot<'_> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let graph = self.0;
        let rings = RingInfo::identify(graph);

        writeln!(f, "graph Molecule {{")?;
        writeln!(f, "    layout=neato;")?;
        writeln!(f, "    multiedge=true;")?;

        for node in graph.node_indices() {
            let atom = &graph[node];
            let shape = if rings.node_in_cycle(node) {
                "doublecircle"
            } else {
                "circle"
            };
            writeln!(
                f,
                "    {} [label=\"{}\", fontcolor=white, shape={}, style=filled, fillcolor={}];",
                node.index(),
                atom,
                shape,
                element_to_color(atom.element)
            )?;
        }

        for edge in graph.edge_references() {
            for _ in 0..edge.weight().order() {
                writeln!(
                    f,
                    "    {} -- {} [style=solid, penwidth=2];",
                    edge.source().index(),
                    edge.target().index()
                )?;
            }
        }

        writeln!(f, "}}")
    }
}

fn element_to_color(element: ChemElement) -> &'static str {
    match element {
        ChemElement::C => "black",
        ChemElement::H => "gray",
        ChemElement::O => "red",
    }
}

pub fn to_dot(graph: &MolecularGraph) -> String {
    MoleculeDot(graph).to_string()
}

/// Writes the DOT text of `graph` to `path`.
pub fn write_dot(graph: &MolecularGraph, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path.as_ref())?;
    file.write_all(to_dot(graph).as_bytes())?;
    debug!(path = %path.as_ref().display(), "wrote DOT file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethanol_dot() {
        let ethanol = parse_smiles("CCO").unwrap();
        let dot = to_dot(&ethanol);
        assert!(dot.starts_with("graph Molecule {"));
        assert!(dot.contains("2 [label=\"O\""));
        assert_eq!(dot.matches(" -- ").count(), 2);
        assert!(!dot.contains("doublecircle"));
    }

    #[test]
    fn test_bonds_and_rings() {
        let graph = parse_smiles("C1CC1=O").unwrap();
        let dot = to_dot(&graph);
        // two ring bonds, the ring closure and a doubled carbonyl
        assert_eq!(dot.matches(" -- ").count(), 5);
        assert_eq!(dot.matches("doublecircle").count(), 3);
    }

    #[test]
    fn test_radical_label() {
        let methyl = parse_smiles("[CH3]").unwrap();
        assert!(to_dot(&methyl).contains("0 [label=\"C.\""));
    }

    #[test]
    fn test_write_dot() {
        let path = std::env::temp_dir().join("chemgraph_test_propane.dot");
        write_dot(&parse_smiles("CCC").unwrap(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("1 -- 2"));
        std::fs::remove_file(&path).unwrap();
    }
}
