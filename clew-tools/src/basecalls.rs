//! FASTA export of basecalled reads
//!
//! Walks a directory tree of fast5 containers and writes one FASTA record
//! per read, using the container path as the header so downstream stages
//! can find the raw signal for any aligned read.

use clew_core::ClewResult;
use clew_signal::Fast5File;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reads exported vs skipped over one directory tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportSummary {
    pub exported: usize,
    pub skipped: usize,
}

fn collect_fast5_files(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_fast5_files(&path, found)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("fast5") {
            found.push(path);
        }
    }
    Ok(())
}

/// Export every readable basecall under `reads_dir` to `output` in FASTA
/// format. Containers that cannot be opened or lack the basecall dataset
/// are skipped with a warning; the run continues.
pub fn export_basecalls<P: AsRef<Path>, Q: AsRef<Path>>(
    reads_dir: P,
    output: Q,
) -> ClewResult<ExportSummary> {
    let mut files = Vec::new();
    collect_fast5_files(reads_dir.as_ref(), &mut files)?;
    files.sort();

    let out = File::create(output.as_ref())?;
    let mut writer = BufWriter::new(out);

    let pb = clew_core::progress::item_bar(files.len() as u64, "reads");
    let mut summary = ExportSummary::default();

    for path in &files {
        let sequence = Fast5File::open(path).and_then(|fast5| fast5.basecall_sequence());
        match sequence {
            Ok(sequence) => {
                writeln!(writer, ">{}", path.display())?;
                writeln!(writer, "{}", sequence)?;
                summary.exported += 1;
            }
            Err(e) => {
                warn!(read = %path.display(), error = %e, "skipping read");
                summary.skipped += 1;
            }
        }
        pb.inc(1);
    }
    writer.flush()?;
    pb.finish_and_clear();

    info!(
        exported = summary.exported,
        skipped = summary.skipped,
        "exported basecalls to FASTA"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_finds_nested_fast5_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("batch_0");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("a.fast5"), b"x").unwrap();
        std::fs::write(nested.join("b.fast5"), b"x").unwrap();
        std::fs::write(nested.join("notes.txt"), b"x").unwrap();

        let mut found = Vec::new();
        collect_fast5_files(dir.path(), &mut found).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_unreadable_containers_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.fast5"), b"not hdf5").unwrap();
        let output = dir.path().join("reads.fasta");

        let summary = export_basecalls(dir.path(), &output).unwrap();
        assert_eq!(summary.exported, 0);
        assert_eq!(summary.skipped, 1);
        assert!(output.exists());
    }
}
