//! External-tool orchestration and alignment-file handling
//!
//! The aligner and its sorting/indexing utility are collaborators, not part
//! of the core: this crate shells out to them and consumes the BAM they
//! produce. Nothing here inspects aligner internals beyond the per-record
//! fields needed for coverage/strand filtering.

pub mod align;
pub mod basecalls;
pub mod pipeline;

// Re-export commonly used types
pub use align::{
    group_reads_by_reference, read_aligned_queries, split_by_reference, AlignedQuery,
    AlignmentRecord,
};
pub use basecalls::export_basecalls;
pub use pipeline::AlignmentPipeline;
