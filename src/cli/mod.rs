//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::StoreConfig;
use crate::error::Result;

/// Output format for command results.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
}

pub mod commands;

/// stbs - set-top box usage record store
#[derive(Parser, Debug)]
#[command(name = "stbs", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Shard directory (default: current directory)
    #[arg(long, global = true, env = "STBS_DIR")]
    pub dir: Option<PathBuf>,

    /// Use the global shard directory (~/.stbstore/shards)
    #[arg(long, global = true)]
    pub global: bool,

    /// Prefix of auto-named shard files
    #[arg(long, global = true)]
    pub base_name: Option<String>,

    /// Records per auto-named shard (default: unbounded)
    #[arg(long, global = true)]
    pub shard_size: Option<usize>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Resolve the store config from the global flags.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag or its environment fallback is invalid.
    pub fn store_config(&self) -> Result<StoreConfig> {
        StoreConfig::resolve(
            self.dir.as_deref(),
            self.global,
            self.base_name.as_deref(),
            self.shard_size,
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import delimited usage files and export them to shards
    Ingest {
        /// Input files (STB|TITLE|PROVIDER|DATE|REV|VIEW_TIME per line)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Load JSON shards and report the distinct records they hold
    Load {
        /// Shard files to load
        #[arg(required = true)]
        shards: Vec<PathBuf>,

        /// Export the merged records to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Select, order and filter records in shards
    Query {
        /// Shard to read (repeatable; default: every shard in the shard directory)
        #[arg(long)]
        shard: Vec<PathBuf>,

        /// Fields to print, comma separated
        #[arg(short, long)]
        select: Option<String>,

        /// Fields to sort by, comma separated
        #[arg(short, long)]
        order: Option<String>,

        /// Exact-match filter, FIELD=VALUE
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show the shards in the shard directory
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
