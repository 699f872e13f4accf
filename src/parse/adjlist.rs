//! Adjacency lists, one atom per line:
//!
//! ```text
//! 1 C 0 {2,S} {3,D}
//! ```
//!
//! The fields are a numeric id, an atom symbol, the number of unpaired
//! electrons (`*` for "any" in patterns) and the bonds to other ids.

use std::collections::HashMap;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, multispace1, one_of},
    combinator::{all_consuming, map, map_res},
    error::{convert_error, VerboseError},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};
use thiserror::Error;

use crate::*;

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdjListError {
    #[error("could not parse adjacency line `{line}`:\n{reason}")]
    Syntax { line: String, reason: String },
    #[error("atom {id} is bonded to {neighbor}, which is not in the list")]
    UnknownNeighbor { id: usize, neighbor: usize },
    #[error("bond between {a} and {b} is not listed the same way on both atoms")]
    InconsistentBond { a: usize, b: usize },
    #[error("atom id {0} appears twice")]
    DuplicateId(usize),
    #[error("atom {0} has a wildcard radical count, which only patterns may use")]
    WildcardRadicals(usize),
    #[error("block `{0}` has no atoms")]
    EmptyBlock(String),
    #[error(transparent)]
    Graph(#[from] ChemGraphError),
}

/// One parsed line of an adjacency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyEntry {
    pub id: usize,
    pub symbol: String,
    /// `None` stands for the `*` wildcard.
    pub radicals: Option<u8>,
    pub bonds: Vec<(usize, Bond)>,
}

fn parse_usize(input: &str) -> Res<usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn parse_symbol(input: &str) -> Res<&str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '!')(input)
}

fn parse_radicals(input: &str) -> Res<Option<u8>> {
    alt((
        map(char('*'), |_| None),
        map(map_res(digit1, str::parse::<u8>), Some),
    ))(input)
}

fn parse_bond_order(input: &str) -> Res<Bond> {
    map(one_of("SDT"), |c| match c {
        'D' => Bond::Double,
        'T' => Bond::Triple,
        _ => Bond::Single,
    })(input)
}

fn parse_bond(input: &str) -> Res<(usize, Bond)> {
    preceded(
        multispace0,
        delimited(
            char('{'),
            separated_pair(parse_usize, char(','), parse_bond_order),
            char('}'),
        ),
    )(input)
}

fn parse_entry(input: &str) -> Res<AdjacencyEntry> {
    let (input, (id, _, symbol, _, radicals, bonds, _)) = tuple((
        parse_usize,
        multispace1,
        parse_symbol,
        multispace1,
        parse_radicals,
        many0(parse_bond),
        multispace0,
    ))(input)?;
    Ok((
        input,
        AdjacencyEntry {
            id,
            symbol: symbol.to_string(),
            radicals,
            bonds,
        },
    ))
}

/// Drops a trailing `//` comment and surrounding whitespace.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(start) => line[..start].trim(),
        None => line.trim(),
    }
}

/// Parses every non-blank line of `text` as an adjacency entry.
pub fn parse_adjacency_entries(text: &str) -> Result<Vec<AdjacencyEntry>, AdjListError> {
    let mut entries = Vec::new();
    for line in text.lines().map(strip_comment).filter(|line| !line.is_empty()) {
        match all_consuming(parse_entry)(line) {
            Ok((_, entry)) => entries.push(entry),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(AdjListError::Syntax {
                    line: line.to_string(),
                    reason: convert_error(line, e),
                })
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(AdjListError::Syntax {
                    line: line.to_string(),
                    reason: "incomplete".to_string(),
                })
            }
        }
    }
    Ok(entries)
}

/// Builds a graph from parsed entries. `make_node` turns an entry into a
/// node weight; bonds are checked to be listed on both of their atoms.
pub fn build_graph<N, F>(
    entries: &[AdjacencyEntry],
    mut make_node: F,
) -> Result<petgraph::graph::UnGraph<N, Bond>, AdjListError>
where
    F: FnMut(usize, &AdjacencyEntry) -> Result<N, AdjListError>,
{
    let mut graph = petgraph::graph::UnGraph::default();
    let mut nodes = HashMap::new();
    for (position, entry) in entries.iter().enumerate() {
        let weight = make_node(position, entry)?;
        if nodes.insert(entry.id, graph.add_node(weight)).is_some() {
            return Err(AdjListError::DuplicateId(entry.id));
        }
    }

    let bonds_of: HashMap<usize, &Vec<(usize, Bond)>> = entries.iter().map(|e| (e.id, &e.bonds)).collect();
    for entry in entries {
        for &(neighbor, bond) in &entry.bonds {
            let Some(&target) = nodes.get(&neighbor) else {
                return Err(AdjListError::UnknownNeighbor { id: entry.id, neighbor });
            };
            let mirrored = bonds_of
                .get(&neighbor)
                .is_some_and(|bonds| bonds.contains(&(entry.id, bond)));
            if !mirrored || neighbor == entry.id {
                return Err(AdjListError::InconsistentBond {
                    a: entry.id,
                    b: neighbor,
                });
            }
            if entry.id < neighbor {
                graph.add_edge(nodes[&entry.id], target, bond);
            }
        }
    }
    Ok(graph)
}

/// Parses the adjacency list of a concrete molecule. Every symbol must be an
/// element and every radical count a number.
pub fn parse_adjacency_list(text: &str) -> Result<MolecularGraph, AdjListError> {
    let entries = parse_adjacency_entries(text)?;
    build_graph(&entries, |position, entry| {
        let Some(element) = ChemElement::from_symbol(&entry.symbol) else {
            return Err(ChemGraphError::InvalidElementType {
                node: position,
                found: entry.symbol.clone(),
            }
            .into());
        };
        let radicals = entry.radicals.ok_or(AdjListError::WildcardRadicals(entry.id))?;
        Ok(Atom::new(element, radicals))
    })
}

/// Splits text into named blocks. Each block starts with a line whose first
/// word is its name and runs until a blank line. `//` comments are ignored.
pub fn named_blocks(text: &str) -> Vec<(String, String)> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, String)> = None;
    for raw in text.lines() {
        if raw.trim().is_empty() {
            blocks.extend(current.take());
            continue;
        }
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }
        match current.as_mut() {
            Some((_, body)) => {
                body.push_str(line);
                body.push('\n');
            }
            None => {
                let name = line.split_whitespace().next().unwrap_or(line).to_string();
                current = Some((name, String::new()));
            }
        }
    }
    blocks.extend(current);
    blocks
}

/// Parses a species file: named adjacency-list blocks separated by blank
/// lines.
pub fn parse_species_blocks(text: &str) -> Result<Vec<(String, MolecularGraph)>, AdjListError> {
    named_blocks(text)
        .into_iter()
        .map(|(name, body)| {
            let graph = parse_adjacency_list(&body)?;
            if graph.node_count() == 0 {
                return Err(AdjListError::EmptyBlock(name));
            }
            Ok((name, graph))
        })
        .collect()
}
