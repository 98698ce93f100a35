//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use tally_core::config::{load_config, load_config_or_default};
use tally_core::Config;

use commands::{MergeProfilesCommand, MergeResultsCommand, MergeShardCommand, WaitCommand};

/// Tally - Aggregate the output of sharded test runs
#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search upwards from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Wait until at least one set of shard tasks has finished
    Wait(WaitCommand),

    /// Merge shard test result files into one
    MergeResults(MergeResultsCommand),

    /// Merge one shard set's test results and raw coverage profiles
    MergeShard(MergeShardCommand),

    /// Merge indexed coverage profiles found under a directory
    MergeProfiles(MergeProfilesCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Wait(ref cmd) => cmd.execute(&self),
            Commands::MergeResults(ref cmd) => cmd.execute(&self),
            Commands::MergeShard(ref cmd) => cmd.execute(&self),
            Commands::MergeProfiles(ref cmd) => cmd.execute(&self),
        }
    }

    /// Load the explicit `--config` file, or the discovered one, or defaults
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let cwd = std::env::current_dir()?;
                let (config, path) = load_config_or_default(&cwd)?;
                if path.is_none() {
                    debug!("no config file, using defaults");
                }
                config
            }
        };
        Ok(config)
    }

    /// Whether human-readable progress should be printed
    pub fn is_chatty(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
