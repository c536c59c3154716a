//! Training-set construction
//!
//! Resolves which k-mer context each aligned read carries, fans the
//! per-read normalization pipeline out across buckets, and fits the
//! per-context signal distributions that become the trained pore model.

pub mod aggregate;
pub mod context;
pub mod fit;

// Re-export commonly used types
pub use aggregate::{
    build_barcode_training_set, build_hairpin_training_set, filter_buckets, RunSummary,
    TrainingSet,
};
pub use context::{barcode, hairpin::HairpinResolver};
pub use fit::{fit_mixture, train_model, MixtureFit};
