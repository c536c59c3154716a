pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "clew",
    version,
    about = "Signal-space training sets for nanopore base-analogue pore models",
    long_about = "Clew extracts raw nanopore signal events, calibrates each read against a \
                  reference pore model, resolves the k-mer context every read carries, and \
                  aggregates normalized signal into training sets for analogue detection."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export basecalled reads from raw containers to FASTA
    Prepare(commands::prepare::PrepareArgs),

    /// Align exported reads and split the result per reference
    Align(commands::align::AlignArgs),

    /// Build a training set and fit a base-analogue model
    Train {
        #[command(subcommand)]
        command: commands::train::TrainCommands,
    },
}
