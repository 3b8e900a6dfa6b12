//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - Order routing (submission, position close, cash)
//! - The fit-and-decide spread model driven by the engine

pub mod execution;
pub mod strategy;

pub use execution::{ExecutionError, OrderRouter};
pub use strategy::SpreadModel;
