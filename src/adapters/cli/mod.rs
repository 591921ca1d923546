//! CLI Adapter
//!
//! Command-line interface for the memescan scanner.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{AnalyzeCmd, CheckCmd, CliApp, Command, RunCmd, ScanCmd};
