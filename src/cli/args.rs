//! CLI argument definitions using clap
//!
//! Commands:
//! - storedq query --config <path> --data <jsonl> --name <template>
//! - storedq list --config <path>
//! - storedq ensure --config <path> --data <jsonl> --specs <dir>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// storedq - run named, schema-validated stored queries
#[derive(Parser, Debug)]
#[command(name = "storedq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute one stored query, parameters read from stdin
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./storedq.json")]
        config: PathBuf,

        /// JSON lines file with collections, indexes and documents
        #[arg(long)]
        data: PathBuf,

        /// Stored query name
        #[arg(long)]
        name: String,
    },

    /// List registered stored queries
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./storedq.json")]
        config: PathBuf,
    },

    /// Check collection index specs against the store
    Ensure {
        /// Path to configuration file
        #[arg(long, default_value = "./storedq.json")]
        config: PathBuf,

        /// JSON lines file with collections, indexes and documents
        #[arg(long)]
        data: PathBuf,

        /// Directory of collection spec files
        #[arg(long)]
        specs: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
