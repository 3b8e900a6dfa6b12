//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Paper: in-memory order router for simulations and backtests
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod paper;

pub use cli::CliApp;
pub use paper::{Fill, PaperBroker};
