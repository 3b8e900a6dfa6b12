//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, CointegrationTest, Config, ConfigError, LoggingSection, SearchSection,
    SimulationSection, SizingSection, StrategySection, TrainingSection,
};
