//! CLI Command Definitions
//!
//! Arguments for every subcommand of the ou-pairs binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ou-pairs - Ornstein-Uhlenbeck pairs trading research tool
#[derive(Parser, Debug)]
#[command(
    name = "ou-pairs",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Ornstein-Uhlenbeck hedge fitting and pairs trading simulation",
    long_about = "ou-pairs fits the hedge ratio of a two-asset spread by maximum likelihood \
                  under an Ornstein-Uhlenbeck model and trades its z-score against a paper broker."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl CliApp {
    pub fn config_path(&self) -> &PathBuf {
        match &self.command {
            Command::Simulate(cmd) => &cmd.config,
            Command::Fit(cmd) => &cmd.config,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strategy over a simulated cointegrated pair
    Simulate(SimulateCmd),

    /// Fit the hedge ratio once and print the winning OU parameters
    Fit(FitCmd),
}

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Simulate a trading session
#[derive(Parser, Debug)]
pub struct SimulateCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// Override the simulation seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Override the number of simulated ticks
    #[arg(long, value_name = "N")]
    pub steps: Option<usize>,

    /// Write the decision log to this file as JSON lines
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Save the session snapshot to this file when the run ends
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Resume from the snapshot file before replaying
    #[arg(long)]
    pub resume: bool,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Fit a hedge on one price window
#[derive(Parser, Debug)]
pub struct FitCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// JSON file with aligned "leg0" and "leg1" price arrays; simulated when omitted
    #[arg(long, value_name = "FILE")]
    pub prices: Option<PathBuf>,

    /// Override the simulation seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Number of best candidates to list
    #[arg(long, value_name = "N", default_value = "5")]
    pub top: usize,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
