mod smiles;
pub use smiles::*;

mod adjlist;
pub use adjlist::*;
