//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabclean: column-level cleaning for tabular data files
#[derive(Parser)]
#[command(name = "tabclean")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply one cleaning operation and write the cleaned table
    Apply {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Operation to apply (missing-values, outliers, data-type,
        /// text-cleaning, duplicates, normalize)
        #[arg(short, long)]
        operation: String,

        /// Target column (not needed for duplicates)
        #[arg(short, long)]
        column: Option<String>,

        /// Operation parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Output path for cleaned data (default: <file>_cleaned.<ext>)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show descriptive statistics for each column
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Profile a single column
        #[arg(short, long)]
        column: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
