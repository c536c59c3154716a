//! fast5 read containers
//!
//! A fast5 file is an HDF5 container holding one read. The dataset paths
//! below are versioned by the basecaller that produced the capture; a
//! container without them is an incompatible or incomplete capture and the
//! read is skipped upstream.

use crate::event::Event;
use clew_core::{ClewError, ClewResult};
use hdf5::types::{FixedAscii, VarLenAscii};
use std::path::{Path, PathBuf};

/// Template-strand event table written by the 1D basecaller.
pub const EVENTS_DATASET: &str = "/Analyses/Basecall_1D_000/BaseCalled_template/Events";

/// 2D-basecall FASTQ, used by the FASTA-export utility.
pub const BASECALL_FASTQ_DATASET: &str = "/Analyses/Basecall_2D_000/BaseCalled_2D/Fastq";

/// The event-table fields consumed here: signal mean, called k-mer, and
/// call confidence. The remaining columns of the compound type are left
/// untouched; HDF5 matches members by name on read.
#[derive(hdf5::H5Type, Clone, Debug)]
#[repr(C)]
struct RawEvent {
    mean: f64,
    model_state: FixedAscii<16>,
    p_model_state: f64,
}

/// An open read container. The underlying handle is released when this is
/// dropped, on every exit path.
pub struct Fast5File {
    file: hdf5::File,
    path: PathBuf,
}

impl Fast5File {
    /// Open a container for reading. Open failures are reported as
    /// `CorruptInput`; callers warn and skip the read.
    pub fn open<P: AsRef<Path>>(path: P) -> ClewResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = hdf5::File::open(&path).map_err(|e| ClewError::CorruptInput {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract the basecalled event sequence in stored (time) order.
    pub fn events(&self) -> ClewResult<Vec<Event>> {
        let dataset =
            self.file
                .dataset(EVENTS_DATASET)
                .map_err(|_| ClewError::MissingData {
                    path: self.path.clone(),
                    dataset: EVENTS_DATASET.to_string(),
                })?;

        let raw = dataset
            .read_1d::<RawEvent>()
            .map_err(|e| ClewError::CorruptInput {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(raw
            .iter()
            .map(|record| Event {
                mean: record.mean,
                kmer: record.model_state.as_str().to_string(),
                confidence: record.p_model_state,
            })
            .collect())
    }

    /// The 2D-basecall FASTQ block, verbatim.
    pub fn basecall_fastq(&self) -> ClewResult<String> {
        let dataset =
            self.file
                .dataset(BASECALL_FASTQ_DATASET)
                .map_err(|_| ClewError::MissingData {
                    path: self.path.clone(),
                    dataset: BASECALL_FASTQ_DATASET.to_string(),
                })?;

        let fastq = dataset
            .read_scalar::<VarLenAscii>()
            .map_err(|e| ClewError::CorruptInput {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(fastq.as_str().to_string())
    }

    /// The called sequence: line two of the 2D-basecall FASTQ.
    pub fn basecall_sequence(&self) -> ClewResult<String> {
        let fastq = self.basecall_fastq()?;
        fastq
            .lines()
            .nth(1)
            .map(str::to_string)
            .ok_or_else(|| ClewError::Parse(format!(
                "truncated FASTQ block in {}",
                self.path.display()
            )))
    }
}
