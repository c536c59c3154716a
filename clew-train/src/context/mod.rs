//! Context resolvers
//!
//! A read is only usable for training if we know which k-mer context it
//! carries. Two ways to know: find the hairpin motif structure in the
//! called sequence, or trust the barcoded alignment grouping.

pub mod barcode;
pub mod hairpin;
