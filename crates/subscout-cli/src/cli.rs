//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subscout - Find the subscriptions hiding in your transaction history
#[derive(Parser)]
#[command(name = "subscout")]
#[command(about = "Recurring payment detector for transaction exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Detection config file (defaults to ~/.local/share/subscout/config/detection.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect recurring payments in a transaction history
    Analyze {
        /// Transaction export to analyze (.json or .csv)
        #[arg(short, long, conflicts_with = "sample", required_unless_present = "sample")]
        file: Option<PathBuf>,

        /// Analyze generated sample history instead of a file
        #[arg(long)]
        sample: bool,

        /// Seed for the sample generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Lookback window in months (default from config)
        #[arg(short, long)]
        months: Option<u32>,

        /// Smallest payment considered
        #[arg(long)]
        min_amount: Option<f64>,

        /// Largest payment considered
        #[arg(long)]
        max_amount: Option<f64>,

        /// User whose history is analyzed
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Print the raw tool result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write synthetic transactions to a JSON file
    Sample {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for the generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Maximum number of transactions
        #[arg(short, long, default_value = "500")]
        limit: usize,

        /// Months of fixed-price subscription charges to include
        #[arg(short, long, default_value = "6")]
        months: u32,
    },

    /// Show the effective detection configuration
    Config,
}
