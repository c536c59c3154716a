//! External alignment orchestration
//!
//! Drives the aligner and its sorting/indexing utility as black boxes:
//! export basecalls to FASTA, `bwa index` + `bwa mem`, pipe through
//! `samtools` into a sorted, indexed BAM, then split per reference with
//! the coverage/strand filter. The core never parses aligner output
//! beyond the resulting BAM records.

use crate::align::{split_by_reference, SplitSummary};
use crate::basecalls::export_basecalls;
use anyhow::{bail, Context, Result};
use clew_core::QualityConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

/// Configuration for one alignment run.
pub struct AlignmentPipeline {
    reads_dir: PathBuf,
    reference: PathBuf,
    output_dir: PathBuf,
    threads: usize,
    quality: QualityConfig,
}

impl AlignmentPipeline {
    pub fn new(reads_dir: PathBuf, reference: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            reads_dir,
            reference,
            output_dir,
            threads: 1,
            quality: QualityConfig::default(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = if threads == 0 {
            num_cpus::get()
        } else {
            threads
        };
        self
    }

    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    /// Verify the external binaries exist before doing any work.
    pub fn check_tools() -> Result<()> {
        for tool in ["bwa", "samtools"] {
            which::which(tool).with_context(|| {
                format!("{} not found on PATH; install it or adjust PATH", tool)
            })?;
        }
        Ok(())
    }

    /// Run the full pipeline. Returns the per-reference split summary.
    pub fn run(&self) -> Result<SplitSummary> {
        Self::check_tools()?;
        std::fs::create_dir_all(&self.output_dir)?;

        let reads_fasta = self.output_dir.join("reads.fasta");
        let sorted_bam = self.output_dir.join("alignments.sorted.bam");

        let export = export_basecalls(&self.reads_dir, &reads_fasta)
            .context("exporting basecalls to FASTA")?;
        if export.exported == 0 {
            bail!(
                "no usable reads found under {} ({} skipped)",
                self.reads_dir.display(),
                export.skipped
            );
        }

        self.index_reference()?;
        self.align_and_sort(&reads_fasta, &sorted_bam)?;
        index_bam(&sorted_bam)?;

        let summary = split_by_reference(&sorted_bam, &self.output_dir, &self.quality)
            .context("splitting alignments by reference")?;
        for output in &summary.outputs {
            index_bam(output)?;
        }

        info!(
            kept = summary.records_kept,
            seen = summary.records_seen,
            "alignment pipeline complete"
        );
        Ok(summary)
    }

    fn index_reference(&self) -> Result<()> {
        let status = Command::new("bwa")
            .arg("index")
            .arg(&self.reference)
            .status()
            .context("spawning bwa index")?;
        if !status.success() {
            bail!("bwa index failed with {}", status);
        }
        Ok(())
    }

    /// `bwa mem -k 1 -x ont2d <ref> <reads> | samtools view -Sb - |
    /// samtools sort -o <out> -`, with each stage's stdout feeding the next.
    fn align_and_sort(&self, reads_fasta: &Path, sorted_bam: &Path) -> Result<()> {
        let pb = clew_core::progress::spinner("aligning reads");

        let mut bwa = Command::new("bwa")
            .arg("mem")
            .args(["-t", &self.threads.to_string()])
            .args(["-k", "1"])
            .args(["-x", "ont2d"])
            .arg(&self.reference)
            .arg(reads_fasta)
            .stdout(Stdio::piped())
            .spawn()
            .context("spawning bwa mem")?;

        let mut view = Command::new("samtools")
            .args(["view", "-Sb", "-"])
            .stdin(bwa.stdout.take().expect("bwa stdout requested"))
            .stdout(Stdio::piped())
            .spawn()
            .context("spawning samtools view")?;

        let mut sort = Command::new("samtools")
            .arg("sort")
            .arg("-o")
            .arg(sorted_bam)
            .arg("-")
            .stdin(view.stdout.take().expect("samtools view stdout requested"))
            .spawn()
            .context("spawning samtools sort")?;

        let bwa_status = bwa.wait().context("waiting for bwa mem")?;
        let view_status = view.wait().context("waiting for samtools view")?;
        let sort_status = sort.wait().context("waiting for samtools sort")?;
        pb.finish_and_clear();

        for (name, status) in [
            ("bwa mem", bwa_status),
            ("samtools view", view_status),
            ("samtools sort", sort_status),
        ] {
            if !status.success() {
                bail!("{} failed with {}", name, status);
            }
        }
        Ok(())
    }
}

fn index_bam(path: &Path) -> Result<()> {
    let status = Command::new("samtools")
        .arg("index")
        .arg(path)
        .status()
        .context("spawning samtools index")?;
    if !status.success() {
        bail!("samtools index failed for {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_threads_default_to_parallelism() {
        let pipeline = AlignmentPipeline::new(
            PathBuf::from("reads"),
            PathBuf::from("ref.fasta"),
            PathBuf::from("out"),
        )
        .with_threads(0);
        assert!(pipeline.threads >= 1);
    }
}
