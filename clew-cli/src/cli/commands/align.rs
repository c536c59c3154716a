use clap::Args;
use colored::*;
use std::path::PathBuf;

use clew_core::QualityConfig;
use clew_tools::AlignmentPipeline;

#[derive(Args)]
pub struct AlignArgs {
    /// Directory containing raw read containers
    #[arg(short, long, value_name = "DIR")]
    pub reads: PathBuf,

    /// Reference FASTA (one record per barcoded reference)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub reference: PathBuf,

    /// Output directory for the sorted BAM and its per-reference splits
    #[arg(short, long, value_name = "DIR", default_value = "alignments")]
    pub output_dir: PathBuf,

    /// Minimum reference coverage for a record to survive filtering
    #[arg(long, value_name = "FRACTION")]
    pub min_reference_cover: Option<f64>,

    /// Minimum query coverage for a record to survive filtering
    #[arg(long, value_name = "FRACTION")]
    pub min_query_cover: Option<f64>,
}

pub fn run(args: AlignArgs, threads: usize) -> anyhow::Result<()> {
    let mut quality = QualityConfig::default();
    if let Some(cover) = args.min_reference_cover {
        quality.min_reference_cover = cover;
    }
    if let Some(cover) = args.min_query_cover {
        quality.min_query_cover = cover;
    }

    let summary = AlignmentPipeline::new(args.reads, args.reference, args.output_dir)
        .with_threads(threads)
        .with_quality(quality)
        .run()?;

    println!(
        "{} kept {} of {} alignment records across {} references",
        "✓".green(),
        summary.records_kept,
        summary.records_seen,
        summary.outputs.len()
    );
    for output in &summary.outputs {
        println!("  {}", output.display());
    }
    Ok(())
}
