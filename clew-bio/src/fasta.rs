//! Reference FASTA I/O
//!
//! References here are single-sequence files: the whole non-header content
//! is one pore-model training reference. Multi-record parsing is a
//! non-goal; an aligner consumes the same file independently.

use crate::sequence::is_reference_base;
use clew_core::{ClewError, ClewResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Line width used when writing reference sequences.
const LINE_WIDTH: usize = 60;

fn open_reader<P: AsRef<Path>>(path: P) -> ClewResult<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read a single-sequence reference FASTA into an uppercase string.
///
/// Characters outside `{A, T, G, C, N}` are tolerated with a warning; the
/// downstream motif search simply never matches them.
pub fn read_reference<P: AsRef<Path>>(path: P) -> ClewResult<String> {
    let reader = open_reader(&path)?;

    let mut reference = String::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('>') {
            continue;
        }
        reference.push_str(line.trim_end());
    }
    reference.make_ascii_uppercase();

    if reference.is_empty() {
        return Err(ClewError::Parse(format!(
            "no sequence content in {}",
            path.as_ref().display()
        )));
    }

    let illegal = reference
        .bytes()
        .filter(|&b| !is_reference_base(b))
        .count();
    if illegal > 0 {
        warn!(
            path = %path.as_ref().display(),
            illegal,
            "reference contains characters outside A, T, G, C, N"
        );
    }

    Ok(reference)
}

/// Write a reference sequence with the given header, wrapped at 60 columns.
pub fn write_reference<P: AsRef<Path>>(path: P, header: &str, reference: &str) -> ClewResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, ">{}", header)?;
    for block in reference.as_bytes().chunks(LINE_WIDTH) {
        writer.write_all(block)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn test_read_reference_uppercases_and_joins_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">ref description").unwrap();
        writeln!(file, "acgtACGT").unwrap();
        writeln!(file, "ttttn").unwrap();

        let reference = read_reference(file.path()).unwrap();
        assert_eq!(reference, "ACGTACGTTTTTN");
    }

    #[test]
    fn test_read_reference_tolerates_illegal_characters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">ref").unwrap();
        writeln!(file, "ACGTXACGT").unwrap();

        // Warns but does not fail
        let reference = read_reference(file.path()).unwrap();
        assert_eq!(reference, "ACGTXACGT");
    }

    #[test]
    fn test_read_reference_empty_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">only a header").unwrap();
        assert!(read_reference(file.path()).is_err());
    }

    #[test]
    fn test_write_reference_wraps_at_sixty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fasta");
        let sequence = "A".repeat(130);

        write_reference(&path, "ref", &sequence).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], ">ref");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
    }

    #[test]
    fn test_reference_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fasta");
        let sequence = "ACGTN".repeat(30);

        write_reference(&path, "ref", &sequence).unwrap();
        assert_eq!(read_reference(&path).unwrap(), sequence);
    }
}
