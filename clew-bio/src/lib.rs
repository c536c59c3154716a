//! Sequence and model-file I/O for Clew

pub mod fasta;
pub mod model;
pub mod sequence;

// Re-export commonly used types
pub use fasta::{read_reference, write_reference};
pub use model::{KmerLevel, PoreModel};
pub use sequence::{find_all, find_first, reverse_complement};
