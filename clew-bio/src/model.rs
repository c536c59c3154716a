//! Pore-model table I/O
//!
//! A pore model maps a k-mer to the mean and standard deviation of the
//! signal it produces in the pore. The table is loaded once per run and
//! shared read-only across all worker tasks.

use clew_core::{ClewError, ClewResult};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Signal distribution for one k-mer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmerLevel {
    pub mean: f64,
    pub stdv: f64,
}

/// Immutable k-mer → signal-level table.
#[derive(Debug, Clone, Default)]
pub struct PoreModel {
    levels: HashMap<String, KmerLevel>,
}

impl PoreModel {
    /// Load a tab-delimited pore-model file.
    ///
    /// Header rows start with `#` or the literal `kmer` token. Data rows
    /// carry at least `kmer\tmean\tstdv`; extra columns are ignored.
    /// Duplicate k-mers overwrite earlier entries — last write wins, which
    /// is intentional and matches upstream model files that append
    /// corrections at the bottom.
    pub fn load<P: AsRef<Path>>(path: P) -> ClewResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut levels = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            if line.is_empty() || line.starts_with('#') || line.starts_with("kmer") {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                return Err(ClewError::MalformedModel {
                    line: line_no,
                    reason: format!("expected at least 3 fields, found {}", fields.len()),
                });
            }

            let mean: f64 = fields[1].parse().map_err(|_| ClewError::MalformedModel {
                line: line_no,
                reason: format!("non-numeric mean {:?}", fields[1]),
            })?;
            let stdv: f64 = fields[2].parse().map_err(|_| ClewError::MalformedModel {
                line: line_no,
                reason: format!("non-numeric standard deviation {:?}", fields[2]),
            })?;

            levels.insert(fields[0].to_string(), KmerLevel { mean, stdv });
        }

        Ok(Self { levels })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, KmerLevel)>) -> Self {
        Self {
            levels: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, kmer: &str) -> Option<&KmerLevel> {
        self.levels.get(kmer)
    }

    /// Lookup that surfaces a missing k-mer as an error.
    pub fn level(&self, kmer: &str) -> ClewResult<&KmerLevel> {
        self.levels
            .get(kmer)
            .ok_or_else(|| ClewError::UnknownKmer(kmer.to_string()))
    }

    pub fn contains(&self, kmer: &str) -> bool {
        self.levels.contains_key(kmer)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KmerLevel)> {
        self.levels.iter()
    }

    /// Write the table in the upstream model format: a fixed header block,
    /// then one row per k-mer with two trailing zero placeholder columns.
    /// Rows are emitted in sorted k-mer order so output is deterministic.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> ClewResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "#model_name\ttemplate_median68pA.model.baseAnalogue")?;
        writeln!(writer, "#type\tbase")?;
        writeln!(writer, "#strand\ttemplate")?;
        writeln!(writer, "#kit\tSQK007")?;
        writeln!(writer, "kmer\tlevel_mean\tlevel_stdv\tsd_mean\tsd_stdv")?;

        let sorted: BTreeMap<&String, &KmerLevel> = self.levels.iter().collect();
        for (kmer, level) in sorted {
            writeln!(writer, "{}\t{}\t{}\t0.0\t0.0", kmer, level.mean, level.stdv)?;
        }
        writer.flush()?;

        Ok(())
    }
}
