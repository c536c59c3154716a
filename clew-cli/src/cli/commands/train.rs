use clap::{Args, Subcommand};
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

use clew_bio::{fasta, PoreModel};
use clew_core::{Config, QualityConfig, TrainingConfig};
use clew_tools::read_aligned_queries;
use clew_train::{
    build_barcode_training_set, build_hairpin_training_set, context::barcode, filter_buckets,
    train_model, HairpinResolver, RunSummary,
};

#[derive(Subcommand)]
pub enum TrainCommands {
    /// Train from a hairpin construct run: resolve each read's redundant
    /// 7-mer by motif search, bucket by context, normalize in parallel
    Hairpin(HairpinArgs),

    /// Train from a barcoded run: the per-reference BAM already fixes the
    /// context, reads are normalized serially
    Barcode(BarcodeArgs),
}

#[derive(Args)]
pub struct HairpinArgs {
    /// Pre-filtered, per-reference BAM from `clew align`
    #[arg(short, long, value_name = "FILE")]
    pub bam: PathBuf,

    /// Reference FASTA for this hairpin construct
    #[arg(short = 'f', long, value_name = "FILE")]
    pub reference: PathBuf,

    /// Base pore-model file (k-mer, mean, stdv)
    #[arg(short, long, value_name = "FILE")]
    pub model: PathBuf,

    /// 0-based index of the base of interest in the reference
    #[arg(short, long, value_name = "INDEX")]
    pub position: usize,

    /// Output path for the trained model
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Minimum reads a bucket needs to be trained on
    #[arg(long, value_name = "COUNT")]
    pub reads_threshold: Option<usize>,

    /// Middle base a candidate context must carry
    #[arg(long, value_name = "BASE")]
    pub base: Option<char>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct BarcodeArgs {
    /// Pre-filtered, per-reference BAM from `clew align`
    #[arg(short, long, value_name = "FILE")]
    pub bam: PathBuf,

    /// Base pore-model file (k-mer, mean, stdv)
    #[arg(short, long, value_name = "FILE")]
    pub model: PathBuf,

    /// The fixed k-mer context these barcoded reads carry
    #[arg(short, long, value_name = "KMER")]
    pub kmer: String,

    /// Output path for the trained model
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(command: TrainCommands) -> anyhow::Result<()> {
    match command {
        TrainCommands::Hairpin(args) => run_hairpin(args),
        TrainCommands::Barcode(args) => run_barcode(args),
    }
}

fn load_config(path: &Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}

fn print_summary(summary: &RunSummary, buckets: usize, fit_skipped: usize, output: &PathBuf) {
    println!(
        "{} trained {} contexts → {}",
        "✓".green(),
        buckets,
        output.display()
    );
    println!(
        "  reads: {} processed, {} skipped; buckets: {} below threshold, {} unfittable",
        summary.reads_processed, summary.reads_skipped, summary.buckets_dropped, fit_skipped
    );
}

fn run_hairpin(args: HairpinArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    let quality: QualityConfig = config.quality;
    let mut training: TrainingConfig = config.training;
    if let Some(threshold) = args.reads_threshold {
        training.reads_threshold = threshold;
    }
    if let Some(base) = args.base {
        training.base_of_interest = base;
    }

    // Fatal at startup: without these nothing can be normalized
    let model = PoreModel::load(&args.model)?;
    let reference = fasta::read_reference(&args.reference)?;
    let resolver =
        HairpinResolver::from_reference(&reference, args.position, training.base_of_interest)?;

    let queries = read_aligned_queries(&args.bam)?;
    println!("{} records in alignment file", queries.len());

    let buckets = resolver.assign_buckets(&queries);
    let (buckets, buckets_dropped) = filter_buckets(buckets, training.reads_threshold);

    let (training_set, mut summary) =
        build_hairpin_training_set(buckets, &model, quality.min_event_confidence);
    summary.buckets_dropped = buckets_dropped;

    let (trained, fit_skipped) = train_model(&training_set, &model);
    trained.write(&args.output)?;

    print_summary(&summary, trained.len(), fit_skipped, &args.output);
    Ok(())
}

fn run_barcode(args: BarcodeArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;

    let model = PoreModel::load(&args.model)?;
    let read_ids = barcode::collect_read_ids(&args.bam)?;
    println!("{} records in alignment file", read_ids.len());

    let (normalized, summary) =
        build_barcode_training_set(&read_ids, &model, config.quality.min_event_confidence);

    let mut training_set = BTreeMap::new();
    training_set.insert(args.kmer.clone(), normalized);

    let (trained, fit_skipped) = train_model(&training_set, &model);
    trained.write(&args.output)?;

    print_summary(&summary, trained.len(), fit_skipped, &args.output);
    Ok(())
}
