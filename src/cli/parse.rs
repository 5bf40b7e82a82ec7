//! CLI parse: clap types for foldsync. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// foldsync - periodic one-way folder mirroring
#[derive(Parser)]
#[command(name = "foldsync")]
#[command(about = "Mirror a source directory onto a replica, verifying every copy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (implies file output)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Root and planning flags shared by every sync command
#[derive(Args, Debug, Clone, Default)]
pub struct RootArgs {
    /// Source directory to mirror from
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Replica directory to mirror into
    #[arg(long)]
    pub replica: Option<PathBuf>,

    /// Skip hashing files whose size matches and whose replica copy is not older
    #[arg(long)]
    pub prefilter: bool,

    /// Path component names to exclude from both trees (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run passes on a fixed interval
    Run {
        #[command(flatten)]
        roots: RootArgs,
        /// Seconds between passes
        #[arg(long)]
        interval: Option<u64>,
        /// Number of passes (default: until interrupted)
        #[arg(long)]
        iterations: Option<u64>,
        /// Stop at the first fatal pass
        #[arg(long)]
        stop_on_fatal: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run exactly one pass
    Once {
        #[command(flatten)]
        roots: RootArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the actions the next pass would take without applying them
    Plan {
        #[command(flatten)]
        roots: RootArgs,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration
    Config,
}
