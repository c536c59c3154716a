//! Alignment-record filtering and per-reference splitting
//!
//! Consumes the sorted BAM produced by the external alignment step. Records
//! are grouped one-file-per-reference so each training reference can be
//! processed independently; only records clearing the coverage and strand
//! filter survive the split.

use clew_core::{ClewError, ClewResult, QualityConfig};
use noodles::bam;
use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The per-record fields the core consumes. Never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    pub read_id: String,
    pub reference_id: usize,
    /// 1-based alignment start on the reference.
    pub alignment_start: usize,
    /// Reference bases spanned by the alignment (aligned end − start).
    pub reference_span: usize,
    /// Query bases inside the aligned region (soft clips excluded).
    pub query_alignment_length: usize,
    pub query_length: usize,
    pub reference_length: usize,
    pub reverse: bool,
}

impl AlignmentRecord {
    /// Coverage/strand quality filter for training reads: the alignment
    /// must span most of the reference, most of the query must be aligned,
    /// and the read must be forward-strand.
    pub fn passes_quality(&self, quality: &QualityConfig) -> bool {
        if self.reference_length == 0 || self.query_length == 0 {
            return false;
        }
        let reference_cover = self.reference_span as f64 / self.reference_length as f64;
        let query_cover = self.query_alignment_length as f64 / self.query_length as f64;

        reference_cover > quality.min_reference_cover
            && query_cover > quality.min_query_cover
            && !self.reverse
    }

    /// Build from a BAM record; `None` for unmapped records.
    pub fn from_bam(record: &bam::Record, header: &sam::Header) -> ClewResult<Option<Self>> {
        let Some(reference_id) = record
            .reference_sequence_id()
            .transpose()
            .map_err(|e| ClewError::Parse(e.to_string()))?
        else {
            return Ok(None);
        };
        let Some(alignment_start) = record
            .alignment_start()
            .transpose()
            .map_err(|e| ClewError::Parse(e.to_string()))?
        else {
            return Ok(None);
        };

        let (_, reference) = header
            .reference_sequences()
            .get_index(reference_id)
            .ok_or_else(|| {
                ClewError::Parse(format!("record references unknown sequence {}", reference_id))
            })?;

        let mut reference_span = 0usize;
        let mut query_alignment_length = 0usize;
        for op in record.cigar().iter() {
            let op = op.map_err(|e| ClewError::Parse(e.to_string()))?;
            match op.kind() {
                Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                    reference_span += op.len();
                    query_alignment_length += op.len();
                }
                Kind::Deletion | Kind::Skip => reference_span += op.len(),
                Kind::Insertion => query_alignment_length += op.len(),
                _ => {}
            }
        }

        let read_id = record
            .name()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_default();

        Ok(Some(AlignmentRecord {
            read_id,
            reference_id,
            alignment_start: alignment_start.get(),
            reference_span,
            query_alignment_length,
            query_length: record.sequence().len(),
            reference_length: reference.length().get(),
            reverse: record.flags().is_reverse_complemented(),
        }))
    }
}

/// A filtered record's identity and called sequence, as needed by the
/// context resolvers.
#[derive(Debug, Clone)]
pub struct AlignedQuery {
    pub read_id: String,
    pub sequence: Vec<u8>,
}

/// Read all records of a pre-filtered BAM as (read id, query sequence)
/// pairs, in record order.
pub fn read_aligned_queries<P: AsRef<Path>>(path: P) -> ClewResult<Vec<AlignedQuery>> {
    let mut reader = bam::io::reader::Builder::default()
        .build_from_path(path.as_ref())
        .map_err(ClewError::Io)?;
    let _header = reader.read_header()?;

    let mut queries = Vec::new();
    for result in reader.records() {
        let record = result?;
        let read_id = record
            .name()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_default();
        let sequence: Vec<u8> = record.sequence().iter().collect();
        queries.push(AlignedQuery { read_id, sequence });
    }

    Ok(queries)
}

/// Outcome of a per-reference split.
#[derive(Debug)]
pub struct SplitSummary {
    /// One output BAM per reference, in header order.
    pub outputs: Vec<PathBuf>,
    pub records_kept: usize,
    pub records_seen: usize,
}

/// Split a sorted alignment file into one BAM per reference, keeping only
/// records that clear the quality filter.
pub fn split_by_reference<P: AsRef<Path>>(
    bam_path: P,
    output_dir: &Path,
    quality: &QualityConfig,
) -> ClewResult<SplitSummary> {
    let mut reader = bam::io::reader::Builder::default()
        .build_from_path(bam_path.as_ref())
        .map_err(ClewError::Io)?;
    let header = reader.read_header()?;

    std::fs::create_dir_all(output_dir)?;

    // One writer per reference, opened up front in header order
    let mut outputs = Vec::new();
    let mut writers = Vec::new();
    for (name, _) in header.reference_sequences() {
        let path = output_dir.join(format!("{}.bam", String::from_utf8_lossy(name)));
        let mut writer = bam::io::writer::Builder::default()
            .build_from_path(&path)
            .map_err(ClewError::Io)?;
        writer.write_header(&header)?;
        outputs.push(path);
        writers.push(writer);
    }

    let mut records_seen = 0usize;
    let mut records_kept = 0usize;
    for result in reader.records() {
        let record = result?;
        records_seen += 1;

        let summary = match AlignmentRecord::from_bam(&record, &header)? {
            Some(summary) => summary,
            None => continue,
        };
        if !summary.passes_quality(quality) {
            continue;
        }

        writers[summary.reference_id].write_alignment_record(&header, &record)?;
        records_kept += 1;
    }

    for writer in &mut writers {
        writer.finish(&header)?;
    }

    if records_kept == 0 {
        warn!("no alignment records cleared the coverage/strand filter");
    }
    info!(
        records_kept,
        records_seen,
        references = outputs.len(),
        "split alignments by reference"
    );

    Ok(SplitSummary {
        outputs,
        records_kept,
        records_seen,
    })
}

/// Group filtered records by reference name without writing files; used
/// when callers only need the read lists.
pub fn group_reads_by_reference<P: AsRef<Path>>(
    bam_path: P,
    quality: &QualityConfig,
) -> ClewResult<HashMap<String, Vec<String>>> {
    let mut reader = bam::io::reader::Builder::default()
        .build_from_path(bam_path.as_ref())
        .map_err(ClewError::Io)?;
    let header = reader.read_header()?;

    let names: Vec<String> = header
        .reference_sequences()
        .keys()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();

    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for result in reader.records() {
        let record = result?;
        let Some(summary) = AlignmentRecord::from_bam(&record, &header)? else {
            continue;
        };
        if summary.passes_quality(quality) {
            groups
                .entry(names[summary.reference_id].clone())
                .or_default()
                .push(summary.read_id);
        }
    }

    Ok(groups)
}
