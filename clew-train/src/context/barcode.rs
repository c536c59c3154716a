//! Barcode context resolution
//!
//! For barcoded runs the external alignment step already grouped reads by
//! reference: every record in one pre-filtered, per-reference BAM belongs
//! to that reference's context. Resolution is just collecting read
//! identifiers in record order.

use clew_core::ClewResult;
use clew_tools::read_aligned_queries;
use std::path::Path;

/// Read identifiers (raw-container paths) from a pre-filtered BAM.
pub fn collect_read_ids<P: AsRef<Path>>(bam_path: P) -> ClewResult<Vec<String>> {
    let queries = read_aligned_queries(bam_path)?;
    Ok(queries.into_iter().map(|q| q.read_id).collect())
}
