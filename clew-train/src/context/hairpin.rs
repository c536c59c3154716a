//! Hairpin motif resolution
//!
//! Hairpin training constructs read `5'-...NNNBNNN...NNNXNNN...-3'`: the
//! base of interest X sits in a redundant 7-mer whose reverse complement
//! (carrying B) appears earlier on the same strand. The resolver locates
//! that 7-mer in a read's called sequence using two fixed 4-base flanks
//! taken from the reference around the position of interest, and refuses
//! any read where the answer is not unambiguous.

use clew_bio::sequence::{find_all, find_first, reverse_complement};
use clew_core::{ClewError, ClewResult};
use clew_tools::AlignedQuery;
use std::collections::{BTreeMap, BTreeSet};

/// Length of the flanking motifs taken from the reference.
const FLANK_LEN: usize = 4;

/// Length of the redundant k-mer the flanks enclose.
const CONTEXT_LEN: usize = 7;

/// Locates the redundant 7-mer context in called read sequences.
#[derive(Debug, Clone)]
pub struct HairpinResolver {
    start_motif: Vec<u8>,
    end_motif: Vec<u8>,
    base_of_interest: u8,
}

impl HairpinResolver {
    /// Derive the flanking motifs from the reference around the position
    /// of interest `position` (0-based index of the base of interest):
    /// four bases on the 5' side of the NNNXNNN domain and four on the 3'
    /// side.
    pub fn from_reference(
        reference: &str,
        position: usize,
        base_of_interest: char,
    ) -> ClewResult<Self> {
        let bytes = reference.as_bytes();
        if position < CONTEXT_LEN || position + CONTEXT_LEN + 1 > bytes.len() {
            return Err(ClewError::InvalidInput(format!(
                "position of interest {} leaves no room for flanking motifs in a {}-base reference",
                position,
                bytes.len()
            )));
        }

        Ok(Self {
            start_motif: bytes[position - 7..position - 3].to_vec(),
            end_motif: bytes[position + 4..position + 8].to_vec(),
            base_of_interest: base_of_interest as u8,
        })
    }

    pub fn start_motif(&self) -> &[u8] {
        &self.start_motif
    }

    pub fn end_motif(&self) -> &[u8] {
        &self.end_motif
    }

    /// Resolve one read to its k-mer bucket, or `None` if the read is
    /// ambiguous.
    ///
    /// Candidates are the substrings strictly between any start-motif
    /// occurrence and any later end-motif occurrence that are exactly
    /// seven bases with the base of interest in the middle. A read is
    /// accepted only when there is exactly one distinct candidate and its
    /// reverse complement occurs strictly upstream of it — the hairpin
    /// fold puts the complementary strand first. Everything else is
    /// discarded; ambiguity is never resolved heuristically.
    pub fn resolve(&self, sequence: &[u8]) -> Option<String> {
        let start_indices = find_all(sequence, &self.start_motif);
        let end_indices = find_all(sequence, &self.end_motif);

        let mut candidates: BTreeSet<&[u8]> = BTreeSet::new();
        for &start in &start_indices {
            let candidate_start = start + FLANK_LEN;
            for &end in &end_indices {
                if end <= candidate_start {
                    continue;
                }
                let candidate = &sequence[candidate_start..end];
                if candidate.len() == CONTEXT_LEN
                    && candidate[CONTEXT_LEN / 2] == self.base_of_interest
                {
                    candidates.insert(candidate);
                }
            }
        }

        if candidates.len() != 1 {
            return None;
        }
        let candidate = *candidates.iter().next().unwrap();

        let candidate_index = find_first(sequence, candidate)?;
        let complement_index = find_first(sequence, &reverse_complement(candidate))?;
        if complement_index >= candidate_index {
            return None;
        }

        String::from_utf8(candidate.to_vec()).ok()
    }

    /// Group reads by resolved bucket. Unresolvable reads are dropped.
    pub fn assign_buckets(&self, queries: &[AlignedQuery]) -> BTreeMap<String, Vec<String>> {
        let mut buckets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for query in queries {
            if let Some(kmer) = self.resolve(&query.sequence) {
                buckets.entry(kmer).or_default().push(query.read_id.clone());
            }
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Reference laid out so the base of interest at index 10 has flanks
    // start = reference[3..7] = "TGCA" and end = reference[14..18] = "GGTT".
    const REFERENCE: &str = "AAATGCATTTATTTGGTTAAA";

    fn resolver() -> HairpinResolver {
        HairpinResolver::from_reference(REFERENCE, 10, 'A').unwrap()
    }

    fn hairpin_read(context: &[u8]) -> Vec<u8> {
        // Complementary strand (reverse complement of the context) first,
        // loop, then the flanked context
        let mut read = Vec::new();
        read.extend_from_slice(&reverse_complement(context));
        read.extend_from_slice(b"CCCC");
        read.extend_from_slice(b"TGCA");
        read.extend_from_slice(context);
        read.extend_from_slice(b"GGTT");
        read
    }

    #[test]
    fn test_flank_motifs_come_from_the_reference() {
        let r = resolver();
        assert_eq!(r.start_motif(), b"TGCA");
        assert_eq!(r.end_motif(), b"GGTT");
    }

    #[test]
    fn test_position_too_close_to_edge_is_rejected() {
        assert!(HairpinResolver::from_reference(REFERENCE, 3, 'A').is_err());
        assert!(HairpinResolver::from_reference(REFERENCE, 16, 'A').is_err());
    }

    #[test]
    fn test_unambiguous_read_is_accepted() {
        let read = hairpin_read(b"GCTACGG");
        assert_eq!(resolver().resolve(&read), Some("GCTACGG".to_string()));
    }

    #[test]
    fn test_read_without_upstream_complement_is_rejected() {
        // Same flanked context but no reverse complement before it
        let mut read = Vec::new();
        read.extend_from_slice(b"CCCCCCCC");
        read.extend_from_slice(b"TGCA");
        read.extend_from_slice(b"GCTACGG");
        read.extend_from_slice(b"GGTT");
        assert_eq!(resolver().resolve(&read), None);
    }

    #[test]
    fn test_two_distinct_candidates_are_rejected() {
        let mut read = hairpin_read(b"GCTACGG");
        // A second, different flanked context later in the read
        read.extend_from_slice(b"TGCA");
        read.extend_from_slice(b"TTTAGGG");
        read.extend_from_slice(b"GGTT");
        assert_eq!(resolver().resolve(&read), None);
    }

    #[test]
    fn test_repeated_identical_candidate_still_counts_once() {
        let mut read = hairpin_read(b"GCTACGG");
        // The same context flanked a second time: still one distinct candidate
        read.extend_from_slice(b"TGCA");
        read.extend_from_slice(b"GCTACGG");
        read.extend_from_slice(b"GGTT");
        assert_eq!(resolver().resolve(&read), Some("GCTACGG".to_string()));
    }

    #[test]
    fn test_wrong_middle_base_is_not_a_candidate() {
        let read = hairpin_read(b"GCTTCGG");
        assert_eq!(resolver().resolve(&read), None);
    }

    #[test]
    fn test_wrong_length_between_flanks_is_not_a_candidate() {
        let mut read = Vec::new();
        read.extend_from_slice(&reverse_complement(b"GCTACG"));
        read.extend_from_slice(b"CCCC");
        read.extend_from_slice(b"TGCA");
        read.extend_from_slice(b"GCTACG"); // six bases, not seven
        read.extend_from_slice(b"GGTT");
        assert_eq!(resolver().resolve(&read), None);
    }

    #[test]
    fn test_assign_buckets_groups_by_context() {
        let r = resolver();
        let queries = vec![
            AlignedQuery {
                read_id: "read-1".into(),
                sequence: hairpin_read(b"GCTACGG"),
            },
            AlignedQuery {
                read_id: "read-2".into(),
                sequence: hairpin_read(b"GCTACGG"),
            },
            AlignedQuery {
                read_id: "read-3".into(),
                sequence: hairpin_read(b"TTTAGGG"),
            },
            AlignedQuery {
                read_id: "read-4".into(),
                sequence: b"TTTTTTTTTT".to_vec(),
            },
        ];

        let buckets = r.assign_buckets(&queries);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets["GCTACGG"], vec!["read-1", "read-2"]);
        assert_eq!(buckets["TTTAGGG"], vec!["read-3"]);
    }
}
