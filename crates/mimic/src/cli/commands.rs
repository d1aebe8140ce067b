//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mimic - time-windowed chat history cache
#[derive(Parser, Debug)]
#[command(name = "mimic")]
#[command(about = "Time-windowed chat history cache with per-user partitioning", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split every cached channel entry into per-user entries
    Separate,

    /// Remove a user's messages from every cache entry
    Purge {
        /// User to purge (defaults to every configured excluded user)
        #[arg(long)]
        user: Option<String>,
    },

    /// Look up a user's recent messages, fetching from Discord on a miss
    #[cfg(feature = "discord")]
    Fetch {
        /// Guild (server) id
        #[arg(long)]
        guild: String,

        /// Channel id
        #[arg(long)]
        channel: String,

        /// User id
        #[arg(long)]
        user: String,

        /// Months of history (defaults to the configured time span)
        #[arg(long)]
        months: Option<u32>,

        /// Maximum number of message texts to print
        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// List cache entries with their age and size
    Inspect {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
