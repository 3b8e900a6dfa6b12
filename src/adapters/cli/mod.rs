//! CLI Adapter
//!
//! Command-line interface for the ou-pairs binary.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, FitCmd, OutputFormat, SimulateCmd};

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
