//! Command-line interface definitions.

pub mod check;
pub mod optimize;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::Strategy;

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "cardplan.toml";

/// Cardplan - buylist purchase optimizer for trading-card marketplaces.
#[derive(Parser, Debug)]
#[command(name = "cardplan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize a buylist against a listing catalog
    Optimize(OptimizeArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `cardplan check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
    /// Validate buylist and catalog files without optimizing
    Input(InputArgs),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Buylist and catalog input files.
#[derive(Parser, Debug)]
pub struct InputArgs {
    /// JSON array of wanted items
    #[arg(short, long)]
    pub buylist: PathBuf,

    /// JSON array of marketplace listings
    #[arg(short = 'l', long)]
    pub catalog: PathBuf,
}

/// Arguments for the `optimize` subcommand.
#[derive(Parser, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the solver strategy (exact, evolutionary, hybrid)
    #[arg(short, long)]
    pub strategy: Option<Strategy>,

    /// Seed the evolutionary search for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the fewest sellers a plan should use
    #[arg(long)]
    pub min_sellers: Option<usize>,

    /// Override the most sellers a plan should use
    #[arg(long)]
    pub max_sellers: Option<usize>,

    /// Exclude a seller (repeatable)
    #[arg(long = "exclude", value_name = "SELLER")]
    pub excluded_sellers: Vec<String>,

    /// Override the generation cap
    #[arg(long)]
    pub generations: Option<usize>,

    /// Override the population size
    #[arg(long)]
    pub population: Option<usize>,

    /// Number of alternatives to print
    #[arg(long, default_value = "5")]
    pub alternatives: usize,

    /// Print the full result envelope as JSON
    #[arg(long)]
    pub json: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}
