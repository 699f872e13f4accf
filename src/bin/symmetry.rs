use anyhow::{bail, Context, Result};
use chemgraph::*;
use csv::Writer;
use tracing::*;

const USAGE: &str = "usage: symmetry [--smiles] <species-file> [forbidden-file]";

/// Reads `name smiles` pairs, one per line.
fn read_smiles_species(text: &str) -> Result<Vec<(String, MolecularGraph)>> {
    let mut species = Vec::new();
    for line in text.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(name), Some(smiles)) = (fields.next(), fields.next()) else {
            bail!("expected `name smiles`, got `{line}`");
        };
        let graph = parse_smiles(smiles).with_context(|| format!("While parsing species {name}"))?;
        species.push((name.to_string(), graph));
    }
    Ok(species)
}

fn main() -> Result<()> {
    init_logging(&std::env::var("CHEMGRAPH_LOG").unwrap_or_else(|_| "info".to_string()));

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let smiles = match args.iter().position(|arg| arg == "--smiles") {
        Some(position) => {
            args.remove(position);
            true
        }
        None => false,
    };
    let (species_file, forbidden_file) = match args.as_slice() {
        [species] => (species.clone(), None),
        [species, forbidden] => (species.clone(), Some(forbidden.clone())),
        _ => bail!(USAGE),
    };

    let forbidden = match forbidden_file {
        Some(path) => ForbiddenStructureSet::load(path)?,
        None => ForbiddenStructureSet::empty(),
    };
    let limits = Limits::default();

    let text = std::fs::read_to_string(&species_file)
        .with_context(|| format!("Failed to read species from {species_file}"))?;
    let species = if smiles {
        read_smiles_species(&text)?
    } else {
        parse_species_blocks(&text).with_context(|| format!("While parsing {species_file}"))?
    };
    info!(count = species.len(), "read species");

    let mut wtr = Writer::from_writer(std::io::stdout());
    wtr.write_record(["name", "formula", "symmetry_number", "radicals", "internal_rotors", "linear"])?;
    for (name, graph) in species {
        let chem_graph = match ChemGraph::make(graph, &forbidden, &limits) {
            Ok(chem_graph) => chem_graph,
            Err(e) => {
                warn!(species = %name, error = %e, "skipping species");
                continue;
            }
        };
        wtr.write_record([
            name,
            chem_graph.chemical_formula().to_string(),
            chem_graph.symmetry_number().to_string(),
            chem_graph.radical_number().to_string(),
            chem_graph.internal_rotors().to_string(),
            chem_graph.is_linear().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
