use clap::Args;
use colored::*;
use std::path::PathBuf;

use clew_tools::export_basecalls;

#[derive(Args)]
pub struct PrepareArgs {
    /// Directory containing raw read containers (searched recursively)
    #[arg(short, long, value_name = "DIR")]
    pub reads: PathBuf,

    /// Output FASTA file
    #[arg(short, long, value_name = "FILE", default_value = "reads.fasta")]
    pub output: PathBuf,
}

pub fn run(args: PrepareArgs) -> anyhow::Result<()> {
    let summary = export_basecalls(&args.reads, &args.output)?;

    println!(
        "{} exported {} reads to {} ({} skipped)",
        "✓".green(),
        summary.exported,
        args.output.display(),
        summary.skipped
    );
    Ok(())
}
