//! CLI module for MergeX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod args;
pub mod commands;

/// MergeX clip merger
///
/// Concatenates video clips into one output, optionally changing playback
/// speed, resolution and volume, by driving an ffmpeg binary.
#[derive(Parser, Debug)]
#[command(name = "merger")]
#[command(about = "MergeX clip merger - Join clips with one ffmpeg filter graph")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: mergex.toml, then config/mergex.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// ffmpeg binary to run
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Seconds to wait for the engine before giving up (0 disables)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Keep partially written output when a merge fails
    #[arg(long, global = true)]
    pub keep_failed: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge clips into a single output
    Merge(args::MergeArgs),
    /// Print the ffmpeg invocation for a merge without running it
    Plan(args::PlanArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
