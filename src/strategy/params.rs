//! Strategy Parameters
//!
//! Session configuration for the OU pairs strategy. Fixed for the life of a
//! session and validated once at construction.
//! Defaults follow an hourly bar cadence: 13 weeks of initial training,
//! weekly retraining.

use serde::{Deserialize, Serialize};

use crate::strategy::hedge_search::{HedgeGrid, Objective, DEFAULT_GRID_POINTS};

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairsConfig {
    /// |z| at or beyond which a position is entered
    pub z_entry: f64,
    /// |z| at or inside which a position is exited
    pub z_exit: f64,
    /// Prices needed before the first training run
    pub num_train_initial: usize,
    /// Ticks between retraining attempts
    pub num_test: usize,
    /// Cap price and spread history at `num_train_initial`
    pub use_fixed_train_size: bool,
    /// Sampling interval of the price feed
    pub dt: f64,
    /// Notional allocated to leg 0
    pub notional_a: f64,
    /// Candidate grid for the leg-1 notional
    pub search: SearchConfig,
    /// Position sizing
    pub sizing: SizingConfig,
    /// Suppress entries when the trained spread fails the cointegration check
    pub require_cointegrated: bool,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self {
            z_entry: 0.5,
            z_exit: 0.1,
            num_train_initial: 24 * 7 * 13,
            num_test: 24 * 7,
            use_fixed_train_size: true,
            dt: 1.0,
            notional_a: 1.0,
            search: SearchConfig::default(),
            sizing: SizingConfig::default(),
            require_cointegrated: false,
        }
    }
}

impl PairsConfig {
    /// Create a new config with custom entry/exit thresholds
    pub fn with_thresholds(mut self, z_entry: f64, z_exit: f64) -> Self {
        self.z_entry = z_entry;
        self.z_exit = z_exit;
        self
    }

    /// Create a new config with custom training cadence
    pub fn with_training(mut self, num_train_initial: usize, num_test: usize) -> Self {
        self.num_train_initial = num_train_initial;
        self.num_test = num_test;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// History cap implied by `use_fixed_train_size`
    pub fn history_capacity(&self) -> Option<usize> {
        self.use_fixed_train_size.then_some(self.num_train_initial)
    }

    /// Candidate grid for the configured notional
    pub fn hedge_grid(&self) -> HedgeGrid {
        match &self.search.candidates {
            Some(values) => HedgeGrid::from_values(values.clone()),
            None => HedgeGrid::uniform(self.notional_a, self.search.grid_points),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.z_exit > 0.0) || !(self.z_entry > self.z_exit) || !self.z_entry.is_finite() {
            return Err(ConfigError::InvalidThresholds {
                z_entry: self.z_entry,
                z_exit: self.z_exit,
            });
        }
        if self.num_train_initial < 2 {
            return Err(ConfigError::InvalidTrainSize(self.num_train_initial));
        }
        if self.num_test == 0 {
            return Err(ConfigError::InvalidTestSize(self.num_test));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidDt(self.dt));
        }
        if !(self.notional_a.is_finite() && self.notional_a > 0.0) {
            return Err(ConfigError::InvalidNotional(self.notional_a));
        }
        self.search.validate()?;
        self.sizing.validate()?;
        Ok(())
    }
}

/// Hedge search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Selection criterion
    pub objective: Objective,
    /// Points in the uniform grid (0, A]
    pub grid_points: usize,
    /// Explicit candidate notionals, overriding the uniform grid
    pub candidates: Option<Vec<f64>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            objective: Objective::LogLikelihood,
            grid_points: DEFAULT_GRID_POINTS,
            candidates: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.candidates {
            Some(values) => {
                if values.is_empty() {
                    return Err(ConfigError::InvalidGrid("candidate list is empty".to_string()));
                }
                if let Some(bad) = values.iter().find(|b| !(b.is_finite() && **b > 0.0)) {
                    return Err(ConfigError::InvalidGrid(format!("candidate {} must be > 0", bad)));
                }
            }
            None if self.grid_points == 0 => {
                return Err(ConfigError::InvalidGrid("grid_points must be > 0".to_string()));
            }
            None => {}
        }
        Ok(())
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Fraction of available cash committed per entry
    pub risk_per_trade: f64,
    /// Round quantities to whole contracts
    pub trade_integer_quantities: bool,
    /// Contract multiplier of leg 0
    pub leg0_multiplier: f64,
    /// Contract multiplier of leg 1
    pub leg1_multiplier: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.1,
            trade_integer_quantities: true,
            leg0_multiplier: 1.0,
            leg1_multiplier: 1.0,
        }
    }
}

impl SizingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade <= 1.0) {
            return Err(ConfigError::InvalidRiskPerTrade(self.risk_per_trade));
        }
        for m in [self.leg0_multiplier, self.leg1_multiplier] {
            if !(m.is_finite() && m > 0.0) {
                return Err(ConfigError::InvalidMultiplier(m));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid thresholds: z_entry {z_entry} must exceed z_exit {z_exit} > 0")]
    InvalidThresholds { z_entry: f64, z_exit: f64 },
    #[error("Invalid initial training size: {0} (minimum 2)")]
    InvalidTrainSize(usize),
    #[error("Invalid retraining interval: {0} (must be > 0)")]
    InvalidTestSize(usize),
    #[error("Invalid sampling interval dt: {0} (must be > 0)")]
    InvalidDt(f64),
    #[error("Invalid notional A: {0} (must be > 0)")]
    InvalidNotional(f64),
    #[error("Invalid hedge grid: {0}")]
    InvalidGrid(String),
    #[error("Invalid risk per trade: {0} (must be 0 < risk <= 1)")]
    InvalidRiskPerTrade(f64),
    #[error("Invalid contract multiplier: {0} (must be > 0)")]
    InvalidMultiplier(f64),
}
