//! Per-reference split against a synthetic BAM

use clew_core::QualityConfig;
use clew_tools::{group_reads_by_reference, read_aligned_queries, split_by_reference};
use noodles::bam;
use noodles::core::Position;
use noodles::sam::alignment::record::cigar::{op::Kind, Op};
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::{self, header::record::value::map::ReferenceSequence, header::record::value::Map};
use std::num::NonZeroUsize;
use std::path::Path;

fn test_header() -> sam::Header {
    sam::Header::builder()
        .add_reference_sequence(
            "ref1",
            Map::<ReferenceSequence>::new(NonZeroUsize::new(100).unwrap()),
        )
        .add_reference_sequence(
            "ref2",
            Map::<ReferenceSequence>::new(NonZeroUsize::new(100).unwrap()),
        )
        .build()
}

fn record(
    name: &str,
    reference_id: usize,
    matched: usize,
    clipped: usize,
    reverse: bool,
) -> RecordBuf {
    let mut record = RecordBuf::default();
    *record.name_mut() = Some(name.into());
    *record.flags_mut() = if reverse {
        Flags::REVERSE_COMPLEMENTED
    } else {
        Flags::empty()
    };
    *record.reference_sequence_id_mut() = Some(reference_id);
    *record.alignment_start_mut() = Some(Position::try_from(1).unwrap());
    *record.cigar_mut() =
        vec![Op::new(Kind::Match, matched), Op::new(Kind::SoftClip, clipped)].into();
    *record.sequence_mut() = vec![b'A'; matched + clipped].into();
    record
}

fn write_bam(path: &Path, header: &sam::Header, records: &[RecordBuf]) {
    let mut writer = bam::io::writer::Builder::default()
        .build_from_path(path)
        .unwrap();
    writer.write_header(header).unwrap();
    for record in records {
        writer.write_alignment_record(header, record).unwrap();
    }
    writer.finish(header).unwrap();
}

#[test]
fn split_keeps_only_filtered_records_per_reference() {
    let dir = tempfile::tempdir().unwrap();
    let bam_path = dir.path().join("alignments.sorted.bam");
    let header = test_header();

    write_bam(
        &bam_path,
        &header,
        &[
            record("read-1", 0, 95, 5, false),  // kept: both covers 0.95
            record("read-2", 0, 95, 5, true),   // reverse strand: dropped
            record("read-3", 1, 75, 25, false), // query cover 0.75: dropped
            record("read-4", 1, 90, 10, false), // kept
        ],
    );

    let out_dir = dir.path().join("split");
    let summary =
        split_by_reference(&bam_path, &out_dir, &QualityConfig::default()).unwrap();

    assert_eq!(summary.records_seen, 4);
    assert_eq!(summary.records_kept, 2);
    assert_eq!(summary.outputs.len(), 2);

    let ref1 = read_aligned_queries(out_dir.join("ref1.bam")).unwrap();
    assert_eq!(ref1.len(), 1);
    assert_eq!(ref1[0].read_id, "read-1");
    assert_eq!(ref1[0].sequence.len(), 100);

    let ref2 = read_aligned_queries(out_dir.join("ref2.bam")).unwrap();
    assert_eq!(ref2.len(), 1);
    assert_eq!(ref2[0].read_id, "read-4");
}

#[test]
fn unmapped_records_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let bam_path = dir.path().join("alignments.sorted.bam");
    let header = test_header();

    let mut unmapped = RecordBuf::default();
    *unmapped.name_mut() = Some("read-5".into());
    *unmapped.flags_mut() = Flags::UNMAPPED;

    let mut records = vec![record("read-1", 0, 95, 5, false)];
    records.push(unmapped);
    write_bam(&bam_path, &header, &records);

    let out_dir = dir.path().join("split");
    let summary =
        split_by_reference(&bam_path, &out_dir, &QualityConfig::default()).unwrap();
    assert_eq!(summary.records_seen, 2);
    assert_eq!(summary.records_kept, 1);
}

#[test]
fn grouping_collects_read_ids_by_reference_name() {
    let dir = tempfile::tempdir().unwrap();
    let bam_path = dir.path().join("alignments.sorted.bam");
    let header = test_header();

    write_bam(
        &bam_path,
        &header,
        &[
            record("read-1", 0, 95, 5, false),
            record("read-4", 1, 90, 10, false),
            record("read-6", 1, 92, 8, false),
        ],
    );

    let groups = group_reads_by_reference(&bam_path, &QualityConfig::default()).unwrap();
    assert_eq!(groups["ref1"], vec!["read-1"]);
    assert_eq!(groups["ref2"], vec!["read-4", "read-6"]);
}
