//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/pairs.toml structure.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::strategy::cointegration::{AlwaysCointegrated, CointegrationCheck, DickeyFullerCheck, Significance};
use crate::strategy::hedge_search::{Objective, SearchError, DEFAULT_GRID_POINTS};
use crate::strategy::ou_model::OuSpreadModel;
use crate::strategy::params::{self, PairsConfig, SearchConfig, SizingConfig};
use crate::strategy::simulation::{CointegratedPair, OuProcess};

/// Main configuration structure matching config/pairs.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub strategy: StrategySection,
    pub training: TrainingSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub sizing: SizingSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub simulation: SimulationSection,
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySection {
    /// |z| at which a position is entered
    pub z_entry: f64,
    /// |z| at which a position is exited
    pub z_exit: f64,
    /// Sampling interval of the price feed (1/252 for daily bars in years)
    pub dt: f64,
    /// Notional allocated to leg 0
    #[serde(default = "default_notional")]
    pub notional_a: f64,
    /// Suppress entries when the fitted spread fails the cointegration test
    #[serde(default)]
    pub require_cointegrated: bool,
    /// Cointegration test run at training time
    #[serde(default)]
    pub cointegration_test: CointegrationTest,
    /// Significance level of the Dickey-Fuller test: "1%", "5%" or "10%"
    #[serde(default)]
    pub significance: Significance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CointegrationTest {
    #[default]
    None,
    DickeyFuller,
}

/// Training cadence section
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSection {
    /// Prices needed before the first fit
    pub num_train_initial: usize,
    /// Ticks between refits
    pub num_test: usize,
    /// Rolling window of `num_train_initial` prices instead of expanding history
    #[serde(default = "default_true")]
    pub use_fixed_train_size: bool,
}

/// Hedge search section (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    /// "log_likelihood" or "mean_reversion"
    #[serde(default)]
    pub objective: Objective,
    #[serde(default = "default_grid_points")]
    pub grid_points: usize,
    /// Explicit B candidates, overriding grid_points
    #[serde(default)]
    pub candidates: Option<Vec<f64>>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            grid_points: DEFAULT_GRID_POINTS,
            candidates: None,
        }
    }
}

/// Position sizing section (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct SizingSection {
    /// Fraction of available cash per entry
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
    #[serde(default = "default_true")]
    pub trade_integer_quantities: bool,
    #[serde(default = "default_multiplier")]
    pub leg0_multiplier: f64,
    #[serde(default = "default_multiplier")]
    pub leg1_multiplier: f64,
}

impl Default for SizingSection {
    fn default() -> Self {
        Self {
            risk_per_trade: default_risk_per_trade(),
            trade_integer_quantities: true,
            leg0_multiplier: 1.0,
            leg1_multiplier: 1.0,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write the decision log here as JSON lines
    #[serde(default)]
    pub events_file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            events_file: None,
        }
    }
}

/// Simulated pair used by the `simulate` command (optional)
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    /// Units of leg 1 per unit of leg 0 in the generated pair
    #[serde(default = "default_hedge")]
    pub hedge: f64,
    #[serde(default = "default_leg1_start")]
    pub leg1_start: f64,
    #[serde(default = "default_leg1_volatility")]
    pub leg1_volatility: f64,
    #[serde(default)]
    pub spread_theta: f64,
    #[serde(default = "default_spread_mu")]
    pub spread_mu: f64,
    #[serde(default = "default_spread_sigma")]
    pub spread_sigma: f64,
    /// Save the session snapshot here when the run ends
    #[serde(default)]
    pub snapshot_file: Option<PathBuf>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            steps: default_steps(),
            starting_cash: default_starting_cash(),
            hedge: default_hedge(),
            leg1_start: default_leg1_start(),
            leg1_volatility: default_leg1_volatility(),
            spread_theta: 0.0,
            spread_mu: default_spread_mu(),
            spread_sigma: default_spread_sigma(),
            snapshot_file: None,
        }
    }
}

impl SimulationSection {
    /// Get seed with environment variable override
    /// Checks OU_PAIRS_SEED env var first, falls back to config value
    pub fn get_seed(&self) -> u64 {
        std::env::var("OU_PAIRS_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.seed)
    }

    pub fn pair(&self) -> CointegratedPair {
        CointegratedPair {
            hedge: self.hedge,
            leg1_start: self.leg1_start,
            leg1_volatility: self.leg1_volatility,
            spread: OuProcess::new(self.spread_theta, self.spread_mu, self.spread_sigma, self.spread_theta),
        }
    }
}

fn default_notional() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_grid_points() -> usize {
    DEFAULT_GRID_POINTS
}
fn default_risk_per_trade() -> f64 {
    0.1
}
fn default_multiplier() -> f64 {
    1.0
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_seed() -> u64 {
    42
}
fn default_steps() -> usize {
    5_000
}
fn default_starting_cash() -> f64 {
    100_000.0
}
fn default_hedge() -> f64 {
    2.0
}
fn default_leg1_start() -> f64 {
    100.0
}
fn default_leg1_volatility() -> f64 {
    0.3
}
fn default_spread_mu() -> f64 {
    3.0
}
fn default_spread_sigma() -> f64 {
    0.5
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid strategy parameters: {0}")]
    Strategy(#[from] params::ConfigError),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        PairsConfig::from(self).validate()?;

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of trace/debug/info/warn/error, got {}",
                self.logging.level
            )));
        }

        let sim = &self.simulation;
        if sim.steps == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.steps must be > 0".to_string(),
            ));
        }
        if !(sim.starting_cash > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "simulation.starting_cash must be > 0, got {}",
                sim.starting_cash
            )));
        }
        if !(sim.leg1_start > 0.0) || !(sim.spread_mu > 0.0) || sim.spread_sigma < 0.0 {
            return Err(ConfigError::ValidationError(
                "simulation needs leg1_start > 0, spread_mu > 0 and spread_sigma >= 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Cointegration test selected by `[strategy] cointegration_test`
    pub fn cointegration_check(&self) -> Box<dyn CointegrationCheck> {
        match self.strategy.cointegration_test {
            CointegrationTest::None => Box::new(AlwaysCointegrated),
            CointegrationTest::DickeyFuller => Box::new(DickeyFullerCheck::new(self.strategy.significance)),
        }
    }

    /// Spread model wired with the configured search and cointegration test
    pub fn spread_model(&self) -> Result<OuSpreadModel, SearchError> {
        let model = OuSpreadModel::from_config(&PairsConfig::from(self))?;
        Ok(model.with_check(self.cointegration_check()))
    }
}

// Conversion from Config to PairsConfig
impl From<&Config> for PairsConfig {
    fn from(config: &Config) -> Self {
        PairsConfig {
            z_entry: config.strategy.z_entry,
            z_exit: config.strategy.z_exit,
            num_train_initial: config.training.num_train_initial,
            num_test: config.training.num_test,
            use_fixed_train_size: config.training.use_fixed_train_size,
            dt: config.strategy.dt,
            notional_a: config.strategy.notional_a,
            search: SearchConfig {
                objective: config.search.objective,
                grid_points: config.search.grid_points,
                candidates: config.search.candidates.clone(),
            },
            sizing: SizingConfig {
                risk_per_trade: config.sizing.risk_per_trade,
                trade_integer_quantities: config.sizing.trade_integer_quantities,
                leg0_multiplier: config.sizing.leg0_multiplier,
                leg1_multiplier: config.sizing.leg1_multiplier,
            },
            require_cointegrated: config.strategy.require_cointegrated,
        }
    }
}
