use petgraph::graph::UnGraph;

mod atom;
pub use atom::*;

mod error;
pub use error::*;

mod canon;
pub use canon::*;

mod rings;
pub use rings::*;

mod equivalence;
pub use equivalence::*;

mod symmetry;
pub use symmetry::*;

mod chemgraph;
pub use chemgraph::*;

mod forbidden;
pub use forbidden::*;

mod parse;
pub use parse::*;

mod thermo;
pub use thermo::*;

mod visualize;
pub use visualize::*;

/// Atoms joined by bonds. Hydrogens are explicit once a graph has been
/// saturated.
pub type MolecularGraph = UnGraph<Atom, Bond>;

/// Installs a formatting subscriber for `tracing` at the given level
/// (`trace`, `debug`, `info`, `warn` or `error`). Unknown levels fall back to
/// `info`. A subscriber that is already installed stays in place.
pub fn init_logging(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
