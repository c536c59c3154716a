//! Training-set aggregation
//!
//! Fans the per-read pipeline (extract → calibrate → normalize) out over
//! k-mer buckets. Bucket tasks are independent: each opens its own read
//! containers and shares only the immutable pore model, so the fan-out is
//! a plain rayon parallel map with a merge after the join. Barcode
//! training sets are small and run strictly serially.

use clew_bio::PoreModel;
use clew_core::progress::item_bar;
use clew_signal::normalize_read;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// k-mer context → one normalized-event sequence per read.
pub type TrainingSet = BTreeMap<String, Vec<Vec<f64>>>;

/// Processed/skipped accounting for one aggregation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reads_processed: usize,
    pub reads_skipped: usize,
    pub buckets_dropped: usize,
}

/// Drop buckets with fewer reads than `reads_threshold` before any
/// normalization work is scheduled; a statistically useless bucket is not
/// worth a task. Returns the surviving buckets and the drop count.
pub fn filter_buckets(
    buckets: BTreeMap<String, Vec<String>>,
    reads_threshold: usize,
) -> (BTreeMap<String, Vec<String>>, usize) {
    let before = buckets.len();
    let kept: BTreeMap<String, Vec<String>> = buckets
        .into_iter()
        .filter(|(_, reads)| reads.len() >= reads_threshold)
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        info!(
            dropped,
            reads_threshold, "dropped buckets below the reads threshold"
        );
    }
    (kept, dropped)
}

fn normalize_bucket_reads(
    reads: &[String],
    model: &PoreModel,
    min_confidence: f64,
    processed: &AtomicUsize,
    skipped: &AtomicUsize,
) -> Vec<Vec<f64>> {
    let mut normalized = Vec::with_capacity(reads.len());
    for read in reads {
        match normalize_read(read, model, min_confidence) {
            Ok(events) => {
                normalized.push(events);
                processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                warn!(read = %read, error = %e, "skipping read");
                skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    normalized
}

/// Build the hairpin training set: one parallel task per bucket,
/// work-stealing across the configured pool, merged after all tasks join.
///
/// Buckets must already be threshold-filtered. The snapshot taken here is
/// in sorted key order, so scheduling and results are deterministic across
/// runs regardless of task completion order.
pub fn build_hairpin_training_set(
    buckets: BTreeMap<String, Vec<String>>,
    model: &PoreModel,
    min_confidence: f64,
) -> (TrainingSet, RunSummary) {
    let tasks: Vec<(String, Vec<String>)> = buckets.into_iter().collect();
    let pb = item_bar(tasks.len() as u64, "buckets");

    let processed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let results: Vec<(String, Vec<Vec<f64>>)> = tasks
        .into_par_iter()
        .map(|(kmer, reads)| {
            let normalized =
                normalize_bucket_reads(&reads, model, min_confidence, &processed, &skipped);
            pb.inc(1);
            (kmer, normalized)
        })
        .collect();
    pb.finish_and_clear();

    // Keys are unique per bucket, so merge order does not matter
    let training_set: TrainingSet = results.into_iter().collect();

    let summary = RunSummary {
        reads_processed: processed.into_inner(),
        reads_skipped: skipped.into_inner(),
        buckets_dropped: 0,
    };
    info!(
        buckets = training_set.len(),
        reads_processed = summary.reads_processed,
        reads_skipped = summary.reads_skipped,
        "built hairpin training set"
    );
    (training_set, summary)
}

/// Build a barcode training set over a flat read list, strictly serially:
/// these sets are small enough that parallel dispatch is not worth it.
pub fn build_barcode_training_set(
    reads: &[String],
    model: &PoreModel,
    min_confidence: f64,
) -> (Vec<Vec<f64>>, RunSummary) {
    let pb = item_bar(reads.len() as u64, "reads");
    let mut summary = RunSummary::default();

    let mut normalized = Vec::with_capacity(reads.len());
    for read in reads {
        match normalize_read(read, model, min_confidence) {
            Ok(events) => {
                normalized.push(events);
                summary.reads_processed += 1;
            }
            Err(e) => {
                warn!(read = %read, error = %e, "skipping read");
                summary.reads_skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    (normalized, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buckets(counts: &[(&str, usize)]) -> BTreeMap<String, Vec<String>> {
        counts
            .iter()
            .map(|(kmer, n)| {
                let reads = (0..*n).map(|i| format!("{}-{}.fast5", kmer, i)).collect();
                (kmer.to_string(), reads)
            })
            .collect()
    }

    #[test]
    fn test_buckets_below_threshold_are_dropped() {
        let input = buckets(&[("AAATAAA", 4), ("CCCACCC", 5), ("GGGAGGG", 9)]);
        let (kept, dropped) = filter_buckets(input, 5);

        assert_eq!(dropped, 1);
        assert!(!kept.contains_key("AAATAAA"));
        assert!(kept.contains_key("CCCACCC"));
        assert!(kept.contains_key("GGGAGGG"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let input = buckets(&[("CCCACCC", 5)]);
        let (kept, dropped) = filter_buckets(input, 5);
        assert_eq!(dropped, 0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_hairpin_aggregation_skips_unreadable_reads() {
        // None of these container paths exist, so every read is skipped;
        // the buckets still appear in the result with empty read lists.
        let input = buckets(&[("AAATAAA", 2), ("CCCACCC", 3)]);
        let model = PoreModel::default();

        let (training_set, summary) = build_hairpin_training_set(input, &model, 0.30);

        assert_eq!(training_set.len(), 2);
        assert!(training_set["AAATAAA"].is_empty());
        assert_eq!(summary.reads_processed, 0);
        assert_eq!(summary.reads_skipped, 5);
    }

    #[test]
    fn test_barcode_aggregation_is_serial_and_counts_skips() {
        let reads: Vec<String> = (0..3).map(|i| format!("missing-{}.fast5", i)).collect();
        let model = PoreModel::default();

        let (normalized, summary) = build_barcode_training_set(&reads, &model, 0.30);

        assert!(normalized.is_empty());
        assert_eq!(summary.reads_skipped, 3);
    }
}
