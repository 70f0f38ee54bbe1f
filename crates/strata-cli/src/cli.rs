//! CLI argument definitions for Strata.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "strata",
    version,
    about = "Resolve and generate software stacks",
    long_about = "Strata explores the space of dependency versions a project admits: \
                  `advise` runs a scored beam search for the best stacks, `generate` \
                  enumerates or samples fully pinned stacks for validation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate fully pinned stacks
    Generate {
        /// Validation service URL, `-` for stdout, or an output directory
        destination: String,
        /// Seed for the random generator
        #[arg(long)]
        seed: Option<u64>,
        /// Decision function: all, sampling
        #[arg(long, default_value = "all")]
        decision: String,
        /// Walk and fill hashes without emitting anything
        #[arg(long)]
        dry_run: bool,
        /// JSON object forwarded to the validation service
        #[arg(long)]
        context: Option<String>,
        /// Stop after this many stacks
        #[arg(long, allow_negative_numbers = true)]
        count: Option<i64>,
        /// Project directory (defaults to the nearest one containing Strata.toml)
        #[arg(long)]
        project: Option<PathBuf>,
        /// Package catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Resolve the best-scoring stacks
    Advise {
        /// Number of stacks to report
        #[arg(long)]
        limit: Option<usize>,
        /// Maximum number of live states
        #[arg(long)]
        beam_width: Option<usize>,
        /// Seed for the random generator
        #[arg(long)]
        seed: Option<u64>,
        /// Project directory (defaults to the nearest one containing Strata.toml)
        #[arg(long)]
        project: Option<PathBuf>,
        /// Package catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
