//! CLI Command Definitions
//!
//! Argument parsing for the memescan scanner. Command handlers live in main.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Memescan - Multi-source meme token market scanner
#[derive(Parser, Debug)]
#[command(
    name = "memescan",
    version = env!("CARGO_PKG_VERSION"),
    about = "Multi-source meme token market scanner",
    long_about = "Memescan aggregates trending tokens from DexScreener, Birdeye and Helius, \
                  filters them by liquidity and volume quality, and optionally scores \
                  candidates with an LLM."
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

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the periodic scan loop
    Run(RunCmd),

    /// Execute a single scan cycle and print the results
    Scan(ScanCmd),

    /// Probe every configured provider connection
    Check(CheckCmd),

    /// Deep-dive analysis of one token address
    Analyze(AnalyzeCmd),
}

/// Start the periodic scan loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}

/// Execute a single scan cycle
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Output format (table, json)
    #[arg(short, long, value_name = "FORMAT", default_value = "table")]
    pub format: String,
}

/// Probe provider connections
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}

/// Analyze a single token
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Token address to analyze
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}
