//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for batchmerge using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Batchmerge - zip batch extractor and record merger
#[derive(Parser, Debug)]
#[command(name = "batchmerge")]
#[command(version, about, long_about = None)]
#[command(author = "Batchmerge Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "batchmerge.toml", env = "BATCHMERGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BATCHMERGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract new batch archives and merge their records into the master file
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show batch state and master file status
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
